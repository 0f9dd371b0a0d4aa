//! Subrepositories nested inside subrepositories

use crate::common::*;

#[test]
fn nested_subrepos_are_rooted_under_their_parents() {
    let models = Models::new();
    let archive = models.compose(&models.nested, ArchiveRequest::new(ArchiveFormat::Tgz));
    let root = &archive.root;
    let files = extract(ArchiveFormat::Tgz, &archive.bytes);

    assert_eq!(
        files[&format!("{}/ext/import1/README", root)],
        IMPORT1_README.as_bytes()
    );
    assert_eq!(
        files[&format!("{}/ext/import1/import2/README", root)],
        IMPORT2_README.as_bytes()
    );
    assert!(files.contains_key(&format!("{}/ext/import1/.hgsub", root)));
    assert!(files.contains_key(&format!("{}/ext/import1/import2/.hg_archival.txt", root)));

    // Depth first: the outer subrepo is reported after the one it contains
    let included: Vec<(&str, NodeId)> = archive
        .report
        .included
        .iter()
        .map(|s| (s.path.as_str(), s.node))
        .collect();
    let inner = format!("{}/ext/import1/import2", root);
    let outer = format!("{}/ext/import1", root);
    assert_eq!(
        included,
        vec![
            (inner.as_str(), models.import2),
            (outer.as_str(), models.import1[1]),
        ]
    );
}

#[test]
fn each_level_carries_its_own_marker() {
    let models = Models::new();
    let archive = models.compose(&models.nested, ArchiveRequest::new(ArchiveFormat::Tar));
    let files = extract(ArchiveFormat::Tar, &archive.bytes);

    let marker = |prefix: &str| {
        String::from_utf8(files[&format!("{}/{}{}", archive.root, prefix, ARCHIVAL_FILE)].clone())
            .unwrap()
    };
    assert!(marker("").contains(&format!("node: {}", models.nested)));
    assert!(marker("ext/import1/").contains(&format!("node: {}", models.import1[1])));
    assert!(marker("ext/import1/import2/").contains(&format!("node: {}", models.import2)));
}

#[test]
fn pinned_revision_wins_over_tip() {
    let models = Models::new();

    // import1 moves on; pmr2hgtest still pins rev 0 at `bound`
    models
        .ws
        .open("import1")
        .changeset()
        .date(at(1_300_000_000))
        .put_file("README", "import1, rewritten\n")
        .commit()
        .unwrap();

    let archive = models.compose(&models.bound, ArchiveRequest::new(ArchiveFormat::Tar));
    let files = extract(ArchiveFormat::Tar, &archive.bytes);
    assert_eq!(
        files[&format!("{}/ext/import1/README", archive.root)],
        IMPORT1_README.as_bytes()
    );
}

#[test]
fn subrepo_entries_use_their_own_commit_time() {
    let models = Models::new();
    let archive = models.compose(&models.bound, ArchiveRequest::new(ArchiveFormat::Tar));
    let entries = read_tar(&archive.bytes).unwrap();
    let mtime = |path: String| entries.iter().find(|e| e.path == path).unwrap().mtime;

    let root_time = models.store().resolve(Some(&models.bound.to_hex())).unwrap().mtime();
    let sub_time = models
        .ws
        .open("import1")
        .resolve(Some(&models.import1[0].to_hex()))
        .unwrap()
        .mtime();
    assert_ne!(root_time, sub_time);
    assert_eq!(mtime(format!("{}/README", archive.root)), root_time);
    assert_eq!(mtime(format!("{}/ext/import1/README", archive.root)), sub_time);
}
