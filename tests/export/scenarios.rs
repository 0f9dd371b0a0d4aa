//! Archive scenarios on the pmr2hgtest family

use crate::common::*;

// ============================================================================
// Plain snapshot
// ============================================================================

#[test]
fn plain_snapshot_tgz_has_marker_and_files() {
    let models = Models::new();
    let archive = models.compose(&models.plain, ArchiveRequest::new(ArchiveFormat::Tgz));

    let root = format!("pmr2hgtest-{}", &models.plain.to_hex()[..12]);
    assert_eq!(archive.root, root);
    assert_eq!(archive.file_name, format!("{}.tar.gz", root));

    let files = extract(ArchiveFormat::Tgz, &archive.bytes);
    let expected: Vec<String> = [".hg_archival.txt", "README", "file1"]
        .iter()
        .map(|p| format!("{}/{}", root, p))
        .collect();
    assert_eq!(files.keys().cloned().collect::<Vec<_>>(), expected);
    assert_eq!(files[&format!("{}/README", root)], README.as_bytes());
    assert_eq!(files[&format!("{}/file1", root)], FILE1.as_bytes());
    assert!(archive.report.is_clean());
}

#[test]
fn archival_marker_is_store_payload() {
    let models = Models::new();
    let store = models.store();
    let snapshot = store.resolve(Some(&models.plain.to_hex())).unwrap();
    let archive = models.compose(&models.plain, ArchiveRequest::new(ArchiveFormat::Tar));

    let files = extract(ArchiveFormat::Tar, &archive.bytes);
    let marker = &files[&format!("{}/{}", archive.root, ARCHIVAL_FILE)];
    assert_eq!(marker, &store.archival_record(&snapshot).unwrap());
    assert!(String::from_utf8_lossy(marker).contains(&models.plain.to_hex()));
}

#[test]
fn name_override_replaces_root() {
    let models = Models::new();
    let archive = models.compose(
        &models.plain,
        ArchiveRequest::new(ArchiveFormat::Tar).with_name("model-export"),
    );
    assert_eq!(archive.root, "model-export");
    assert_eq!(archive.file_name, "model-export.tar");
    assert!(archive_paths(&archive)
        .iter()
        .all(|p| p.starts_with("model-export/")));
}

#[test]
fn escaping_name_rejected() {
    let models = Models::new();
    let request = ArchiveRequest::new(ArchiveFormat::Tar)
        .with_revision(models.plain.to_hex())
        .with_name("../outside");
    assert!(matches!(
        models.ws.compose("pmr2hgtest", &request),
        Err(Error::InvalidInput(_))
    ));
}

// ============================================================================
// Bound subrepository
// ============================================================================

#[test]
fn bound_subrepo_is_spliced() {
    let models = Models::new();
    let archive = models.compose(&models.bound, ArchiveRequest::new(ArchiveFormat::Tgz));
    let root = &archive.root;
    let files = extract(ArchiveFormat::Tgz, &archive.bytes);

    assert_eq!(
        files[&format!("{}/ext/import1/README", root)],
        IMPORT1_README.as_bytes()
    );
    let marker = &files[&format!("{}/ext/import1/.hg_archival.txt", root)];
    assert!(String::from_utf8_lossy(marker).contains(&models.import1[0].to_hex()));

    // Root entries are all still there
    assert!(files.contains_key(&format!("{}/README", root)));
    assert!(files.contains_key(&format!("{}/file1", root)));
    assert!(files.contains_key(&format!("{}/.hgsub", root)));

    assert_eq!(archive.report.included.len(), 1);
    assert_eq!(archive.report.included[0].path, format!("{}/ext/import1", root));
    assert_eq!(archive.report.included[0].node, models.import1[0]);
}

#[test]
fn subrepos_can_be_left_out() {
    let models = Models::new();
    let archive = models.compose(
        &models.bound,
        ArchiveRequest::new(ArchiveFormat::Tgz).with_subrepos(false),
    );
    let prefix = format!("{}/ext/", archive.root);
    let paths = archive_paths(&archive);
    assert!(!paths.is_empty());
    assert!(paths.iter().all(|p| !p.starts_with(&prefix)), "{:?}", paths);
    assert!(archive.report.included.is_empty());
}

#[test]
fn zip_leaves_subrepos_out_by_default() {
    let models = Models::new();
    let archive = models.compose(&models.bound, ArchiveRequest::new(ArchiveFormat::Zip));
    let prefix = format!("{}/ext/", archive.root);
    assert!(archive_paths(&archive).iter().all(|p| !p.starts_with(&prefix)));
}

// ============================================================================
// Unresolvable bindings
// ============================================================================

#[test]
fn foreign_binding_is_skipped_in_tar() {
    let models = Models::new();
    let archive = models.compose(&models.foreign, ArchiveRequest::new(ArchiveFormat::Tar));
    let root = &archive.root;
    let paths = archive_paths(&archive);

    let skipped = format!("{}/ext/elsewhere", root);
    assert!(paths.iter().all(|p| !p.starts_with(&skipped)), "{:?}", paths);
    // The sibling binding next to it still resolves
    assert!(paths.contains(&format!("{}/ext/import1/README", root)));

    assert_eq!(archive.report.skipped.len(), 1);
    assert_eq!(archive.report.skipped[0].path, skipped);
    assert_eq!(archive.report.skipped[0].reason, SkipReason::NotSibling);
}

#[test]
fn foreign_binding_fails_strict_export() {
    let models = Models::new();
    let store = models.store();
    let owner = models.ws.container.owner("pmr2hgtest").unwrap();
    let composer = models
        .ws
        .composer(ComposerConfig::default().with_policy(ResolutionPolicy::Strict));

    let result = composer.compose(
        &store,
        &owner,
        &ArchiveRequest::new(ArchiveFormat::Tar).with_revision(models.foreign.to_hex()),
    );
    assert!(matches!(
        result,
        Err(Error::SubrepoUnresolved { prefix, .. }) if prefix == "ext/elsewhere"
    ));

    // Strict is fine when every binding resolves
    composer
        .compose(
            &store,
            &owner,
            &ArchiveRequest::new(ArchiveFormat::Tar).with_revision(models.nested.to_hex()),
        )
        .unwrap();
}

#[test]
fn unknown_revision_fails() {
    let models = Models::new();
    let request = ArchiveRequest::new(ArchiveFormat::Tar).with_revision("deadbeefcafe");
    assert!(matches!(
        models.ws.compose("pmr2hgtest", &request),
        Err(Error::RevisionNotFound { .. })
    ));
}

#[test]
fn unknown_format_fails_before_io() {
    assert!(matches!(
        ArchiveRequest::for_format_name("rar"),
        Err(Error::UnsupportedFormat { .. })
    ));
}

#[test]
fn empty_repository_has_nothing_to_export() {
    let ws = Workspace::new();
    ws.init("blank");
    assert!(matches!(
        ws.compose("blank", &ArchiveRequest::new(ArchiveFormat::Tgz)),
        Err(Error::RepoEmpty)
    ));
}
