//! CLI integration tests for legion-config.
//!
//! These tests run the binary against spec files and variant tokens and
//! check the printed CMake arguments and diagnostics.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the legion-config binary command, isolated from the user's config.
fn legion_config(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("legion-config").unwrap();
    cmd.current_dir(dir)
        .env("LEGION_CONFIG", dir.join("no-global-config.toml"));
    cmd
}

/// Create a temporary directory for test projects.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

fn write_spec(dir: &Path, contents: &str) -> String {
    let path = dir.join("legion.toml");
    fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

// ============================================================================
// legion-config flags
// ============================================================================

#[test]
fn test_flags_defaults() {
    let tmp = temp_dir();

    let output = legion_config(tmp.path()).arg("flags").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.first(), Some(&"-DLegion_EMBED_GASNet=OFF"));
    assert_eq!(lines.last(), Some(&"-DLegion_MAX_FIELDS=512"));
    assert!(!stdout.contains("BUILD_MARCH"));
    assert!(lines.contains(&"-DLegion_USE_ZLIB=ON"));
    assert!(lines.contains(&"-DLegion_MAX_FIELDS=512"));
}

#[test]
fn test_flags_from_spec_file() {
    let tmp = temp_dir();
    let spec = write_spec(
        tmp.path(),
        r#"
version = "21.03.0"
compiler = "gcc@9.3.0"
build_type = "Release"

[variants]
network = "gasnet"
conduit = "ibv"
max_fields = 100
"#,
    );

    legion_config(tmp.path())
        .args(["flags", &spec])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "-DLegion_NETWORKS=gasnetex\n-DLegion_EMBED_GASNet=ON\n-DGASNet_CONDUIT=ibv\n",
        ))
        .stdout(predicate::str::contains("-DLegion_MAX_FIELDS=128\n"));
}

#[test]
fn test_flags_variant_tokens_override_file() {
    let tmp = temp_dir();
    let spec = write_spec(
        tmp.path(),
        r#"
[variants]
cuda = true
cuda_arch = "60"
"#,
    );

    legion_config(tmp.path())
        .args(["flags", &spec, "-v", "cuda_arch=80", "-v", "+cuda_hijack"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-DLegion_CUDA_ARCH=80\n"))
        .stdout(predicate::str::contains("-DLegion_HIJACK_CUDART=ON\n"));
}

#[test]
fn test_flags_json() {
    let tmp = temp_dir();

    let output = legion_config(tmp.path())
        .args(["flags", "--json", "-v", "network=mpi"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["flags"][0], "-DLegion_NETWORKS=mpi");
    assert!(value["env"].as_object().unwrap().is_empty());
}

#[test]
fn test_flags_export_env_for_kokkos() {
    let tmp = temp_dir();
    let spec = write_spec(
        tmp.path(),
        r#"
[variants]
kokkos = true

[dependencies.kokkos]
version = "3.3.01"
cxx = "/opt/kokkos/bin/nvcc_wrapper"
"#,
    );

    legion_config(tmp.path())
        .args(["flags", &spec, "--export-env"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "export KOKKOS_CXX_COMPILER=/opt/kokkos/bin/nvcc_wrapper\n",
        ))
        .stdout(predicate::str::contains("-DLegion_USE_Kokkos=ON\n"));
}

#[test]
fn test_flags_conflict_fails() {
    let tmp = temp_dir();

    legion_config(tmp.path())
        .args(["flags", "-v", "network=mpi", "-v", "conduit=ibv"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(
            "conduit attribute requires 'network=gasnet'.",
        ));
}

#[test]
fn test_flags_invalid_value_fails() {
    let tmp = temp_dir();

    legion_config(tmp.path())
        .args(["flags", "-v", "conduit=tcp"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "invalid value `tcp` for variant `conduit`",
        ))
        .stderr(predicate::str::contains("aries, ibv, udp, mpi, ucx"));
}

#[test]
fn test_flags_unknown_variant_fails() {
    let tmp = temp_dir();

    legion_config(tmp.path())
        .args(["flags", "-v", "+gpu"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown variant `gpu`"));
}

#[test]
fn test_flags_missing_spec_file() {
    let tmp = temp_dir();

    legion_config(tmp.path())
        .args(["flags", "does-not-exist.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read spec file"));
}

#[test]
fn test_flags_uses_project_config() {
    let tmp = temp_dir();
    let config_dir = tmp.path().join(".legion-config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        r#"
[variants]
hwloc = true
output_level = "debug"
"#,
    )
    .unwrap();

    legion_config(tmp.path())
        .arg("flags")
        .assert()
        .success()
        .stdout(predicate::str::contains("-DLegion_USE_HWLOC=ON\n"))
        .stdout(predicate::str::contains("-DLegion_OUTPUT_LEVEL=DEBUG\n"));
}

// ============================================================================
// legion-config check
// ============================================================================

#[test]
fn test_check_accepts_valid_spec() {
    let tmp = temp_dir();

    legion_config(tmp.path())
        .args(["check", "-v", "+cuda", "-v", "+cuda_hijack"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("ok: legion@stable%gcc"));
}

#[test]
fn test_check_rejects_hijack_without_cuda() {
    let tmp = temp_dir();

    legion_config(tmp.path())
        .args(["check", "-v", "+cuda_hijack"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'+cuda_hijack' requires '+cuda'."));
}

#[test]
fn test_check_reports_gasnet_root_conflict_before_path() {
    let tmp = temp_dir();

    legion_config(tmp.path())
        .args([
            "check",
            "-v",
            "network=mpi",
            "-v",
            "gasnet_root=/opt/gasnet_nonexistent",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "'gasnet_root' is only valid when 'network=gasnet'.",
        ))
        .stderr(predicate::str::contains("no such directory").not());
}

#[test]
fn test_check_rejects_unknown_version() {
    let tmp = temp_dir();
    let spec = write_spec(tmp.path(), "version = \"1.0.0\"\n");

    legion_config(tmp.path())
        .args(["check", &spec])
        .assert()
        .failure()
        .stderr(predicate::str::contains("`1.0.0`"));
}

// ============================================================================
// legion-config variants / deps
// ============================================================================

#[test]
fn test_variants_lists_catalog() {
    let tmp = temp_dir();

    legion_config(tmp.path())
        .arg("variants")
        .assert()
        .success()
        .stdout(predicate::str::contains("conduit"))
        .stdout(predicate::str::contains("gasnet_root"))
        .stdout(predicate::str::contains("max_fields"));
}

#[test]
fn test_variants_json() {
    let tmp = temp_dir();

    let output = legion_config(tmp.path())
        .args(["variants", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let variants = value.as_array().unwrap();
    assert_eq!(variants.len(), 28);
    assert_eq!(variants[0]["name"], "network");
}

#[test]
fn test_deps_default() {
    let tmp = temp_dir();

    legion_config(tmp.path())
        .arg("deps")
        .assert()
        .success()
        .stdout("cmake@3.16: (build)\nzlib (link)\n");
}

#[test]
fn test_deps_for_mpi() {
    let tmp = temp_dir();

    legion_config(tmp.path())
        .args(["deps", "-v", "network=mpi"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mpi (link)"));
}

#[test]
fn test_deps_all() {
    let tmp = temp_dir();

    legion_config(tmp.path())
        .args(["deps", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# when: always"))
        .stdout(predicate::str::contains("kokkos@3.3.01"));
}

// ============================================================================
// legion-config completions
// ============================================================================

#[test]
fn test_completions_bash() {
    let tmp = temp_dir();

    legion_config(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("legion-config"));
}
