//! Container format equivalence, determinism, and response metadata

use crate::common::*;

#[test]
fn tar_and_tgz_hold_the_same_files() {
    let models = Models::new();
    let tar = models.compose(&models.nested, ArchiveRequest::new(ArchiveFormat::Tar));
    let tgz = models.compose(&models.nested, ArchiveRequest::new(ArchiveFormat::Tgz));

    assert_ne!(tar.bytes, tgz.bytes);
    assert_eq!(
        extract(ArchiveFormat::Tar, &tar.bytes),
        extract(ArchiveFormat::Tgz, &tgz.bytes)
    );
}

#[test]
fn zip_with_subrepos_holds_the_same_files() {
    let models = Models::new();
    let tar = models.compose(&models.nested, ArchiveRequest::new(ArchiveFormat::Tar));
    let zip = models.compose(
        &models.nested,
        ArchiveRequest::new(ArchiveFormat::Zip).with_subrepos(true),
    );
    assert_eq!(
        extract(ArchiveFormat::Tar, &tar.bytes),
        extract(ArchiveFormat::Zip, &zip.bytes)
    );
}

#[test]
fn composing_twice_is_byte_identical() {
    let models = Models::new();
    for format in ArchiveFormat::ALL {
        let request = ArchiveRequest::new(format).with_subrepos(true);
        let first = models.compose(&models.nested, request.clone());
        let second = models.compose(&models.nested, request);
        assert_eq!(first.bytes, second.bytes, "{} differs", format);
        assert_eq!(first.checksum, second.checksum);
        assert_eq!(first.checksum, xxh3_hex(&first.bytes));
    }
}

#[test]
fn gzip_member_is_named_after_root() {
    let models = Models::new();
    let archive = models.compose(&models.plain, ArchiveRequest::new(ArchiveFormat::Tgz));
    let decoder = flate2::read::GzDecoder::new(archive.bytes.as_slice());
    let header = decoder.header().unwrap();
    assert_eq!(
        header.filename().unwrap(),
        format!("{}.tar", archive.root).as_bytes()
    );
}

#[test]
fn tar_modes_follow_manifest() {
    let ws = Workspace::new();
    ws.init("tools")
        .changeset()
        .date(at(1_400_000_000))
        .put_file("README", "tools\n")
        .put_executable("bin/run", "#!/bin/sh\necho run\n")
        .put_symlink("latest", "bin/run")
        .commit()
        .unwrap();

    let archive = ws
        .compose("tools", &ArchiveRequest::new(ArchiveFormat::Tar))
        .unwrap();
    let entries = read_tar(&archive.bytes).unwrap();
    let mode = |name: &str| {
        let path = format!("{}/{}", archive.root, name);
        entries.iter().find(|e| e.path == path).unwrap().mode
    };
    assert_eq!(mode("README"), FileMode::Regular);
    assert_eq!(mode("bin/run"), FileMode::Executable);
    assert_eq!(mode("latest"), FileMode::Symlink);

    let link = entries
        .iter()
        .find(|e| e.path.ends_with("/latest"))
        .unwrap();
    assert_eq!(link.link_target().unwrap(), "bin/run");
}

#[test]
fn response_headers_per_format() {
    let models = Models::new();
    let header = |format: ArchiveFormat, name: &str| -> String {
        let archive = models.compose(&models.plain, ArchiveRequest::new(format));
        archive
            .headers()
            .into_iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v)
            .unwrap_or_default()
    };

    assert_eq!(header(ArchiveFormat::Tar, "Content-Type"), "application/x-tar");
    assert_eq!(header(ArchiveFormat::Tgz, "Content-Type"), "application/x-tar");
    assert_eq!(header(ArchiveFormat::Zip, "Content-Type"), "application/zip");
    assert_eq!(header(ArchiveFormat::Tgz, "Content-Encoding"), "gzip");
    assert_eq!(header(ArchiveFormat::Tar, "Content-Encoding"), "");

    let disposition = header(ArchiveFormat::Zip, "Content-Disposition");
    assert!(disposition.starts_with("attachment; filename=pmr2hgtest-"));
    assert!(disposition.ends_with(".zip"));
}
