//! Archived bytes equal stored bytes, for arbitrary trees and every format

use std::collections::BTreeMap;

use crate::common::*;
use proptest::prelude::*;

fn tree() -> impl Strategy<Value = BTreeMap<String, Vec<u8>>> {
    prop::collection::btree_map(
        "[a-z]{1,6}(/[a-z]{1,6}){0,2}\\.dat",
        prop::collection::vec(any::<u8>(), 0..2048),
        1..12,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn archived_files_match_store_reads(files in tree()) {
        let ws = Workspace::new();
        let store = ws.init("model");
        let mut changeset = store.changeset().date(at(1_500_000_000));
        for (path, data) in &files {
            changeset = changeset.put_file(path.clone(), data);
        }
        let snapshot = changeset.commit().unwrap();

        for format in ArchiveFormat::ALL {
            let archive = ws.compose("model", &ArchiveRequest::new(format)).unwrap();
            let extracted = extract(format, &archive.bytes);

            // Every stored file plus the provenance marker, nothing else
            prop_assert_eq!(extracted.len(), files.len() + 1);
            for path in store.files(&snapshot) {
                let archived = &extracted[&format!("{}/{}", archive.root, path)];
                prop_assert_eq!(archived, &store.read(&snapshot, &path).unwrap());
            }
        }
    }
}
