//! Behaviour-driven tests for complete release builds.
//!
//! Git is replaced by a `StubExecutor` replaying the invocations a real
//! repository would answer; archives are written by the native writer into a
//! temporary checkout. Tests use the rstest-bdd v0.5.0 mutable world pattern.

use camino::{Utf8Path, Utf8PathBuf};
use flate2::read::GzDecoder;
use joomla_build::archive::NativeArchiveWriter;
use joomla_build::config::PackagerConfig;
use joomla_build::error::BuildError;
use joomla_build::manifest::ANCHOR_PATHS;
use joomla_build::release::{self, BuildSummary, ReleaseContext};
use joomla_build::snapshot::{INSTALL_MANIFEST, ROOT_MANIFEST};
use joomla_build::test_utils::{
    ExpectedCall, StubExecutor, failure_output, stdout_output, success_output, tar_stream,
};
use joomla_build::version::Version;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use tempfile::TempDir;

const GIT: &str = "/usr/bin/git";

// ---------------------------------------------------------------------------
// World types
// ---------------------------------------------------------------------------

struct ReleaseWorld {
    _dir: TempDir,
    root: Utf8PathBuf,
    version: Option<Version>,
    diffs: BTreeMap<String, Vec<String>>,
    missing_tags: BTreeSet<String>,
    summary: Option<BuildSummary>,
    error: Option<BuildError>,
}

#[fixture]
fn world() -> ReleaseWorld {
    let dir = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("utf-8 temp dir");
    ReleaseWorld {
        _dir: dir,
        root,
        version: None,
        diffs: BTreeMap::new(),
        missing_tags: BTreeSet::new(),
        summary: None,
        error: None,
    }
}

fn version(world: &ReleaseWorld) -> &Version {
    world.version.as_ref().expect("version set")
}

fn scratch(world: &ReleaseWorld) -> Utf8PathBuf {
    PackagerConfig::default().scratch_path(&world.root)
}

fn release_tree() -> Vec<(&'static str, &'static str)> {
    let mut files: Vec<(&str, &str)> = ANCHOR_PATHS
        .iter()
        .filter(|path| **path != ROOT_MANIFEST)
        .map(|path| (*path, "anchor"))
        .collect();
    files.extend([
        (INSTALL_MANIFEST, "<extension/>"),
        ("libraries/foo.php", "<?php // foo"),
        ("installation/index.php", "<?php // installer"),
        ("tests/unit/bootstrap.php", "<?php // tests"),
        ("build.xml", "<project/>"),
        (".travis.yml", "language: php"),
    ]);
    files
}

fn rev_parse(root: &str, tag: &str, found: bool) -> ExpectedCall {
    let reference = format!("refs/tags/{tag}");
    let output = if found {
        success_output()
    } else {
        failure_output("")
    };
    ExpectedCall::new(
        GIT,
        &["-C", root, "rev-parse", "--verify", "--quiet", &reference],
        Ok(output),
    )
}

/// Scripts the git invocations a repository with the world's tags answers.
fn expected_calls(world: &ReleaseWorld) -> Vec<ExpectedCall> {
    let root = world.root.as_str();
    let version = version(world);
    let target = version.full_version();

    let mut calls = vec![
        ExpectedCall::new("which", &["git"], Ok(stdout_output("/usr/bin/git\n"))),
        rev_parse(root, &target, true),
        ExpectedCall::new(
            GIT,
            &["-C", root, "archive", "--format=tar", &target],
            Ok(stdout_output(tar_stream(&release_tree()))),
        ),
    ];

    for revision in (0..version.dev_level()).rev() {
        let previous = version.tag_for(revision);
        if world.missing_tags.contains(&previous) {
            calls.push(rev_parse(root, &previous, false));
            break;
        }
        calls.push(rev_parse(root, &previous, true));
        calls.push(rev_parse(root, &target, true));

        let diff: String = world
            .diffs
            .get(&previous)
            .into_iter()
            .flatten()
            .map(|record| format!("{record}\0"))
            .collect();
        let from = format!("tags/{previous}");
        let to = format!("tags/{target}");
        calls.push(ExpectedCall::new(
            GIT,
            &["-C", root, "diff", "-z", "--name-status", &from, &to],
            Ok(stdout_output(diff)),
        ));
    }
    calls
}

fn archive_entries(path: &Utf8Path) -> BTreeSet<String> {
    let file = fs::File::open(path).expect("open archive");
    if path.extension() == Some("zip") {
        let zip = zip::ZipArchive::new(file).expect("read zip");
        return zip.file_names().map(str::to_owned).collect();
    }
    let mut archive = tar::Archive::new(GzDecoder::new(file));
    archive
        .entries()
        .expect("entries")
        .map(|entry| {
            let entry = entry.expect("entry");
            entry.path().expect("path").to_string_lossy().into_owned()
        })
        .collect()
}

fn patch_archive(world: &ReleaseWorld, name: &str) -> Utf8PathBuf {
    scratch(world)
        .join(format!("packages{}", version(world).release()))
        .join(name)
}

fn full_archive(world: &ReleaseWorld, name: &str) -> Utf8PathBuf {
    scratch(world)
        .join(format!("packages_full{}", version(world).full_version()))
        .join(name)
}

// ---------------------------------------------------------------------------
// Step definitions
// ---------------------------------------------------------------------------

#[given("a repository at version \"{release}\" level \"{level}\" status \"{status}\"")]
fn given_repository(world: &mut ReleaseWorld, release: String, level: u32, status: String) {
    let version_file = world.root.join(PackagerConfig::default().version_file);
    fs::create_dir_all(version_file.parent().expect("parent")).expect("mkdir");
    let source = format!(
        "<?php\nfinal class JVersion\n{{\n\
         \tpublic $RELEASE = '{release}';\n\
         \tpublic $DEV_LEVEL = '{level}';\n\
         \tpublic $DEV_STATUS = '{status}';\n}}\n"
    );
    fs::write(&version_file, source).expect("write version file");
    world.version = Some(Version::new(release, level, status));
}

#[given("tag \"{previous}\" differs from \"{target}\" by \"{status}\" \"{path}\"")]
fn given_diff(world: &mut ReleaseWorld, previous: String, target: String, status: String, path: String) {
    assert_eq!(target, version(world).full_version());
    world
        .diffs
        .entry(previous)
        .or_default()
        .push(format!("{status}\0{path}"));
}

#[given("tag \"{tag}\" is missing")]
fn given_missing_tag(world: &mut ReleaseWorld, tag: String) {
    world.missing_tags.insert(tag);
}

#[when("the release is built")]
fn when_built(world: &mut ReleaseWorld) {
    let executor = StubExecutor::new(expected_calls(world));
    let config = PackagerConfig::default();
    let context = ReleaseContext {
        executor: &executor,
        writer: &NativeArchiveWriter,
        config: &config,
        repo_root: &world.root,
    };

    match release::run(&context, &mut std::io::sink()) {
        Ok(summary) => {
            executor.assert_finished();
            world.summary = Some(summary);
        }
        Err(err) => world.error = Some(err),
    }
}

#[then("the build succeeds")]
fn then_succeeds(world: &mut ReleaseWorld) {
    assert!(world.error.is_none(), "build failed: {:?}", world.error);
    assert!(world.summary.is_some());
}

#[then("the patch archive \"{name}\" contains \"{path}\"")]
fn then_patch_contains(world: &mut ReleaseWorld, name: String, path: String) {
    let entries = archive_entries(&patch_archive(world, &name));
    assert!(entries.contains(&path), "{name} lacks {path}: {entries:?}");
}

#[then("the patch archive \"{name}\" does not contain \"{path}\"")]
fn then_patch_omits(world: &mut ReleaseWorld, name: String, path: String) {
    let entries = archive_entries(&patch_archive(world, &name));
    assert!(!entries.contains(&path), "{name} unexpectedly has {path}");
}

#[then("the deleted list for \"{tag}\" is \"{path}\"")]
fn then_deleted_list(world: &mut ReleaseWorld, tag: String, path: String) {
    let deleted = scratch(world).join(format!("diffconvert/{tag}-deleted"));
    let contents = fs::read_to_string(deleted).expect("read deleted list");
    assert_eq!(contents, format!("{path}\n"));
}

#[then("the full package \"{name}\" contains \"{path}\"")]
fn then_full_contains(world: &mut ReleaseWorld, name: String, path: String) {
    let entries = archive_entries(&full_archive(world, &name));
    assert!(entries.contains(&path), "{name} lacks {path}");
}

#[then("the full package \"{name}\" does not contain \"{path}\"")]
fn then_full_omits(world: &mut ReleaseWorld, name: String, path: String) {
    let entries = archive_entries(&full_archive(world, &name));
    assert!(!entries.contains(&path), "{name} unexpectedly has {path}");
}

#[then("the build fails because tag \"{tag}\" is missing")]
fn then_tag_missing(world: &mut ReleaseWorld, tag: String) {
    assert!(matches!(
        world.error,
        Some(BuildError::TagNotFound { tag: ref missing }) if *missing == tag
    ));
}

#[then("no full package directory exists")]
fn then_no_full_dir(world: &mut ReleaseWorld) {
    let dir = full_archive(world, "");
    assert!(!dir.exists(), "{dir} should not exist");
}

// ---------------------------------------------------------------------------
// Scenario bindings
// ---------------------------------------------------------------------------

#[scenario(
    path = "tests/features/release_build.feature",
    name = "Build 3.2.1 with one earlier revision"
)]
fn scenario_build_maintenance_release(world: ReleaseWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/release_build.feature",
    name = "Missing earlier tag aborts the build"
)]
fn scenario_missing_tag(world: ReleaseWorld) {
    let _ = world;
}
