//! End-to-end CLI behaviour tests for `boilerpl8`.
//!
//! These scenarios invoke the compiled binary inside a temporary working
//! directory, with the configuration directory pointed at an empty location
//! so user settings cannot leak in.

use boilerpl8::archive::ArchiveKind;
use boilerpl8::test_support::{Entry, write_archive};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::process::{Command, Output};
use tempfile::TempDir;

#[derive(Default)]
struct CliWorld {
    args: Vec<String>,
    output: Option<Output>,
    // Keep temp_dir alive for the lifetime of the scenario.
    temp_dir: Option<TempDir>,
}

#[fixture]
fn world() -> CliWorld {
    CliWorld {
        temp_dir: Some(TempDir::new().expect("temp dir")),
        ..CliWorld::default()
    }
}

fn workdir(world: &CliWorld) -> std::path::PathBuf {
    world
        .temp_dir
        .as_ref()
        .expect("temp_dir set")
        .path()
        .join("work")
}

fn output(world: &CliWorld) -> &Output {
    world.output.as_ref().expect("output not set")
}

fn stdout(world: &CliWorld) -> String {
    String::from_utf8_lossy(&output(world).stdout).into_owned()
}

fn stderr(world: &CliWorld) -> String {
    String::from_utf8_lossy(&output(world).stderr).into_owned()
}

// ---------------------------------------------------------------------------
// Step definitions
// ---------------------------------------------------------------------------

#[given("the arguments \"{args}\"")]
fn given_arguments(world: &mut CliWorld, args: String) {
    world.args = args.split_whitespace().map(str::to_owned).collect();
}

#[given("a local zip archive \"{name}\" wrapping its files in \"{root}\"")]
fn given_local_zip(world: &mut CliWorld, name: String, root: String) {
    let dir = workdir(world);
    std::fs::create_dir_all(&dir).expect("mkdir work");
    let readme = format!("{root}/README.md");
    let setup = format!("{root}/setup.py");
    write_archive(
        &dir.join(&name),
        ArchiveKind::Zip,
        &[
            Entry::File(&readme, b"# keight\n"),
            Entry::File(&setup, b"setup()\n"),
        ],
    )
    .expect("write archive");
}

#[when("boilerpl8 is run")]
fn when_boilerpl8_run(world: &mut CliWorld) {
    let dir = workdir(world);
    std::fs::create_dir_all(&dir).expect("mkdir work");
    let config_home = world
        .temp_dir
        .as_ref()
        .expect("temp_dir set")
        .path()
        .join("config");

    let output = Command::new(env!("CARGO_BIN_EXE_boilerpl8"))
        .args(&world.args)
        .current_dir(&dir)
        .env("XDG_CONFIG_HOME", &config_home)
        .env_remove("BOILERPL8_API_URL")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run boilerpl8");
    world.output = Some(output);
}

#[then("the command exits successfully")]
fn then_exits_successfully(world: &mut CliWorld) {
    let output = output(world);
    assert!(
        output.status.success(),
        "expected success, stderr: {}",
        stderr(world)
    );
}

#[then("the command fails")]
fn then_fails(world: &mut CliWorld) {
    assert_eq!(
        output(world).status.code(),
        Some(1),
        "expected exit status 1, stdout: {}, stderr: {}",
        stdout(world),
        stderr(world)
    );
}

#[then("stdout contains \"{text}\"")]
fn then_stdout_contains(world: &mut CliWorld, text: String) {
    let stdout = stdout(world);
    assert!(stdout.contains(&text), "unexpected stdout: {stdout}");
}

#[then("stdout is the package version")]
fn then_stdout_is_version(world: &mut CliWorld) {
    assert_eq!(stdout(world), format!("{}\n", env!("CARGO_PKG_VERSION")));
}

#[then("stderr is \"{text}\"")]
fn then_stderr_is(world: &mut CliWorld, text: String) {
    assert_eq!(stderr(world).trim_end(), text);
}

#[then("stderr contains \"{text}\"")]
fn then_stderr_contains(world: &mut CliWorld, text: String) {
    let stderr = stderr(world);
    assert!(stderr.contains(&text), "unexpected stderr: {stderr}");
}

#[then("the working directory has \"{path}\"")]
fn then_workdir_has(world: &mut CliWorld, path: String) {
    let path = workdir(world).join(path);
    assert!(path.is_file(), "expected {} to exist", path.display());
}

// ---------------------------------------------------------------------------
// Scenario bindings
// ---------------------------------------------------------------------------

#[scenario(path = "tests/features/cli.feature", name = "Help is printed")]
fn scenario_help(world: CliWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/cli.feature", name = "Help wins over version")]
fn scenario_help_over_version(world: CliWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/cli.feature", name = "Version is printed")]
fn scenario_version(world: CliWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/cli.feature", name = "Missing reference is reported")]
fn scenario_missing_reference(world: CliWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/cli.feature", name = "Unknown option is reported")]
fn scenario_unknown_option(world: CliWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/cli.feature", name = "Unknown schema is reported")]
fn scenario_unknown_schema(world: CliWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/cli.feature",
    name = "Local archive is unpacked into the working directory"
)]
fn scenario_local_archive(world: CliWorld) {
    let _ = world;
}
