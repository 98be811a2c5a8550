//! Unit tests for the native archive writer.

use super::*;
use rstest::{fixture, rstest};
use std::io::Read;
use tempfile::TempDir;

struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
    out: Utf8PathBuf,
}

#[fixture]
fn workspace() -> Workspace {
    let dir = TempDir::new().expect("temp dir creation succeeds");
    let base = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("utf-8 temp dir");
    let root = base.join("snapshot");
    let out = base.join("out");
    fs::create_dir_all(root.join("libraries/cms")).expect("mkdir libraries");
    fs::create_dir_all(&out).expect("mkdir out");
    fs::write(root.join("index.php"), b"<?php // root").expect("write index");
    fs::write(root.join("libraries/index.html"), b"<html></html>").expect("write anchor");
    fs::write(root.join("libraries/cms/a.php"), b"<?php // a").expect("write a");
    fs::write(root.join("libraries/cms/b.php"), b"<?php // b").expect("write b");
    Workspace {
        _dir: dir,
        root,
        out,
    }
}

fn listed() -> Vec<Utf8PathBuf> {
    vec![
        Utf8PathBuf::from("index.php"),
        Utf8PathBuf::from("libraries/cms/a.php"),
    ]
}

fn tar_names<R: Read>(reader: R) -> Vec<String> {
    let mut archive = tar::Archive::new(reader);
    archive
        .entries()
        .expect("entries")
        .map(|entry| {
            let entry = entry.expect("entry");
            entry.path().expect("path").to_string_lossy().into_owned()
        })
        .collect()
}

fn archive_names(format: ArchiveFormat, path: &Utf8Path) -> Vec<String> {
    let file = File::open(path).expect("open archive");
    match format {
        ArchiveFormat::TarBz2 => tar_names(bzip2::read::BzDecoder::new(file)),
        ArchiveFormat::TarGz => tar_names(flate2::read::GzDecoder::new(file)),
        ArchiveFormat::Zip => {
            let archive = zip::ZipArchive::new(file).expect("zip archive");
            archive.file_names().map(str::to_owned).collect()
        }
    }
}

#[rstest]
#[case::bzip2(ArchiveFormat::TarBz2)]
#[case::gzip(ArchiveFormat::TarGz)]
#[case::zip(ArchiveFormat::Zip)]
fn writes_exactly_the_listed_files(workspace: Workspace, #[case] format: ArchiveFormat) {
    let destination = workspace.out.join(format!("patch.{format}"));
    NativeArchiveWriter
        .write(format, &destination, &workspace.root, &listed())
        .expect("archive written");

    let mut names = archive_names(format, &destination);
    names.sort();
    assert_eq!(names, ["index.php", "libraries/cms/a.php"]);
}

#[rstest]
fn listed_directory_is_not_recursed(workspace: Workspace) {
    let destination = workspace.out.join("dir.tar.gz");
    let entries = vec![Utf8PathBuf::from("libraries/cms")];
    NativeArchiveWriter
        .write(ArchiveFormat::TarGz, &destination, &workspace.root, &entries)
        .expect("archive written");

    let names = archive_names(ArchiveFormat::TarGz, &destination);
    assert_eq!(names.len(), 1, "only the directory entry itself: {names:?}");
    assert!(names[0].starts_with("libraries/cms"));
}

#[rstest]
fn zip_stores_directories_with_trailing_slash(workspace: Workspace) {
    let destination = workspace.out.join("tree.zip");
    let entries = vec![
        Utf8PathBuf::from("libraries"),
        Utf8PathBuf::from("libraries/index.html"),
    ];
    NativeArchiveWriter
        .write(ArchiveFormat::Zip, &destination, &workspace.root, &entries)
        .expect("archive written");

    let names = archive_names(ArchiveFormat::Zip, &destination);
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"libraries/".to_owned()));
    assert!(names.contains(&"libraries/index.html".to_owned()));
}

#[rstest]
fn zip_preserves_file_contents(workspace: Workspace) {
    let destination = workspace.out.join("contents.zip");
    NativeArchiveWriter
        .write(ArchiveFormat::Zip, &destination, &workspace.root, &listed())
        .expect("archive written");

    let file = File::open(&destination).expect("open");
    let mut archive = zip::ZipArchive::new(file).expect("zip archive");
    let mut contents = String::new();
    archive
        .by_name("libraries/cms/a.php")
        .expect("entry present")
        .read_to_string(&mut contents)
        .expect("read entry");
    assert_eq!(contents, "<?php // a");
}

#[rstest]
#[case::bzip2(ArchiveFormat::TarBz2)]
#[case::gzip(ArchiveFormat::TarGz)]
#[case::zip(ArchiveFormat::Zip)]
fn missing_entry_is_an_error(workspace: Workspace, #[case] format: ArchiveFormat) {
    let destination = workspace.out.join(format!("missing.{format}"));
    let entries = vec![Utf8PathBuf::from("bin/index.html")];
    let result = NativeArchiveWriter.write(format, &destination, &workspace.root, &entries);
    assert!(
        matches!(result, Err(ArchiveError::MissingEntry { ref path }) if path == "bin/index.html"),
        "expected MissingEntry, got {result:?}"
    );
}

#[rstest]
fn unwritable_destination_is_an_io_error(workspace: Workspace) {
    let destination = workspace.out.join("no/such/dir/patch.zip");
    let result = NativeArchiveWriter.write(
        ArchiveFormat::Zip,
        &destination,
        &workspace.root,
        &listed(),
    );
    assert!(matches!(result, Err(ArchiveError::Io(_))));
}
