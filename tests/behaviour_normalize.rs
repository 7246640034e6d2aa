//! Behaviour-driven tests for archive normalization.
//!
//! Scenarios build real archives in a temporary directory and extract them
//! with `ArchiveNormalizer`, using the rstest-bdd mutable world pattern.

use boilerpl8::archive::{ArchiveKind, ArchiveNormalizer, ExtractionError, NormalizedDirectory};
use boilerpl8::test_support::{Entry, write_archive};
use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::fs;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// World types
// ---------------------------------------------------------------------------

struct NormalizeWorld {
    _temp_dir: TempDir,
    workdir: Utf8PathBuf,
    downloads: Utf8PathBuf,
    archive: Option<Utf8PathBuf>,
    result: Option<Result<NormalizedDirectory, ExtractionError>>,
}

#[fixture]
fn world() -> NormalizeWorld {
    let temp_dir = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).expect("UTF-8 path");
    let workdir = root.join("work");
    let downloads = root.join("downloads");
    fs::create_dir_all(&workdir).expect("mkdir work");
    fs::create_dir_all(&downloads).expect("mkdir downloads");
    NormalizeWorld {
        _temp_dir: temp_dir,
        workdir,
        downloads,
        archive: None,
        result: None,
    }
}

fn build_archive(world: &mut NormalizeWorld, name: &str, kind: ArchiveKind, entries: [&str; 2]) {
    let path = world.downloads.join(name);
    let files: Vec<Entry<'_>> = entries
        .iter()
        .map(|entry| Entry::File(*entry, entry.as_bytes()))
        .collect();
    write_archive(path.as_std_path(), kind, &files).expect("write archive");
    world.archive = Some(path);
}

fn extract(world: &mut NormalizeWorld, target: Option<&str>) {
    let archive = world.archive.clone().expect("archive set");
    let normalizer = ArchiveNormalizer::new(world.workdir.clone());
    let mut progress = Vec::new();
    world.result = Some(normalizer.extract(&archive, target, &mut progress));
}

fn workdir_listing(world: &NormalizeWorld) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(&world.workdir)
        .expect("read workdir")
        .map(|entry| entry.expect("dir entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// ---------------------------------------------------------------------------
// Step definitions
// ---------------------------------------------------------------------------

#[given("a zip archive \"{name}\" with entries \"{a}\" and \"{b}\"")]
fn given_zip_archive(world: &mut NormalizeWorld, name: String, a: String, b: String) {
    build_archive(world, &name, ArchiveKind::Zip, [a.as_str(), b.as_str()]);
}

#[given("a tar.gz archive \"{name}\" with entries \"{a}\" and \"{b}\"")]
fn given_tar_gz_archive(world: &mut NormalizeWorld, name: String, a: String, b: String) {
    build_archive(world, &name, ArchiveKind::TarGz, [a.as_str(), b.as_str()]);
}

#[given("a file \"{name}\" that is not a supported archive")]
fn given_unsupported_file(world: &mut NormalizeWorld, name: String) {
    let path = world.downloads.join(&name);
    fs::write(&path, b"not an archive").expect("write file");
    world.archive = Some(path);
}

#[given("an existing file \"{path}\"")]
fn given_existing_file(world: &mut NormalizeWorld, path: String) {
    let path = world.workdir.join(&path);
    let parent = path.parent().expect("file has a parent");
    fs::create_dir_all(parent).expect("mkdir parent");
    fs::write(&path, b"existing").expect("write file");
}

#[when("the archive is extracted into \"{target}\"")]
fn when_extracted_into(world: &mut NormalizeWorld, target: String) {
    extract(world, Some(&target));
}

#[when("the archive is extracted under its own name")]
fn when_extracted_default(world: &mut NormalizeWorld) {
    extract(world, None);
}

#[then("the directory \"{dir}\" contains \"{file}\"")]
fn then_directory_contains(world: &mut NormalizeWorld, dir: String, file: String) {
    let path = world.workdir.join(&dir).join(&file);
    assert!(path.is_file(), "expected {path} to exist; result: {:?}", world.result);
}

#[then("the directory \"{dir}\" does not contain \"{file}\"")]
fn then_directory_lacks(world: &mut NormalizeWorld, dir: String, file: String) {
    let path = world.workdir.join(&dir).join(&file);
    assert!(!path.exists(), "expected {path} to be gone");
}

#[then("the working directory contains only \"{name}\"")]
fn then_workdir_contains_only(world: &mut NormalizeWorld, name: String) {
    assert_eq!(workdir_listing(world), [name]);
}

#[then("extraction fails as an unsupported format")]
fn then_unsupported(world: &mut NormalizeWorld) {
    let result = world.result.as_ref().expect("extraction attempted");
    assert!(
        matches!(result, Err(ExtractionError::UnsupportedArchiveFormat { .. })),
        "unexpected result: {result:?}"
    );
}

// ---------------------------------------------------------------------------
// Scenario bindings
// ---------------------------------------------------------------------------

#[scenario(
    path = "tests/features/archive_normalization.feature",
    name = "Zip with a single root directory is collapsed"
)]
fn scenario_zip_single_root(world: NormalizeWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/archive_normalization.feature",
    name = "Zip with flat files keeps its layout"
)]
fn scenario_zip_flat(world: NormalizeWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/archive_normalization.feature",
    name = "Re-extraction removes stale files"
)]
fn scenario_rerun(world: NormalizeWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/archive_normalization.feature",
    name = "Unsupported archive formats are rejected before any change"
)]
fn scenario_unsupported(world: NormalizeWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/archive_normalization.feature",
    name = "Tarball root directory is renamed to the target"
)]
fn scenario_tar_root(world: NormalizeWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/archive_normalization.feature",
    name = "Flat tarball keeps its layout"
)]
fn scenario_tar_flat(world: NormalizeWorld) {
    let _ = world;
}
