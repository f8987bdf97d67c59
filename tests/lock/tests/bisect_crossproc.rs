//! Cross-process determinism.
//!
//! Spawns the `bisect_fixture` binary under several environment variants
//! and asserts that all produce identical output. Bisection results must
//! not be influenced by process-level state (cwd, locale, env vars).

use std::path::Path;
use std::process::Command;

use lock_tests::bisect_test_helpers::fixture_path;

/// Resolve the path to the compiled binary.
///
/// `cargo test` puts test binaries in `target/debug/deps/`; the
/// `bisect_fixture` binary lives one level up.
fn binary_path() -> String {
    let mut path = std::env::current_exe()
        .expect("can resolve test binary path")
        .parent()
        .expect("binary dir exists")
        .parent()
        .expect("deps parent exists")
        .to_path_buf();
    path.push("bisect_fixture");
    path.to_string_lossy().to_string()
}

fn workspace_root() -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(Path::parent)
        .expect("workspace root exists")
        .to_string_lossy()
        .to_string()
}

/// Run the binary with the given cwd and environment overrides.
/// Returns stdout as a string.
fn run_variant(work_dir: &str, extra_args: &[&str], env_overrides: &[(&str, &str)]) -> String {
    let bin = binary_path();
    let fixture = fixture_path("requirements_compiled.txt");

    let mut command = Command::new(&bin);
    command
        .arg(&fixture)
        .arg("six,urllib3,pytz")
        .args(extra_args)
        .current_dir(work_dir)
        .env_remove("LC_ALL")
        .env_remove("LC_COLLATE")
        .env_remove("LANG")
        .env_remove("LANGUAGE")
        .env_remove("RUST_LOG");
    for &(key, val) in env_overrides {
        command.env(key, val);
    }

    let output = command.output().unwrap_or_else(|e| {
        panic!("failed to spawn {bin} (work_dir={work_dir}, overrides={env_overrides:?}): {e}")
    });
    assert!(
        output.status.success(),
        "bisect_fixture exited with {}: stderr={}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout is valid UTF-8")
}

#[test]
fn crossproc_determinism_env_variants() {
    let root = workspace_root();
    let baseline = run_variant(&root, &[], &[]);
    assert!(baseline.contains("report_digest=sha256:"));
    assert!(baseline.contains("culprit=six"));
    assert!(baseline.contains("culprit=urllib3"));
    assert!(baseline.contains("culprit=pytz"));

    let alt_cwd = if cfg!(target_os = "windows") {
        "C:\\"
    } else {
        "/tmp"
    };
    assert_eq!(
        baseline,
        run_variant(alt_cwd, &[], &[]),
        "output differs when cwd changes to {alt_cwd}"
    );
    assert_eq!(
        baseline,
        run_variant(&root, &[], &[("LC_ALL", "C"), ("LANG", "C")]),
        "output differs when LC_ALL=C LANG=C"
    );
    assert_eq!(
        baseline,
        run_variant(
            &root,
            &[],
            &[
                ("BISECT_NOISE", "should_not_matter"),
                ("TZ", "America/New_York"),
                ("RUST_LOG", "trace"),
            ],
        ),
        "output differs with spurious env vars"
    );
}

#[test]
fn crossproc_policy_changes_digest_not_culprits() {
    let root = workspace_root();
    let deferred = run_variant(&root, &[], &[]);
    let eager = run_variant(&root, &["--split-children"], &[]);

    let field = |out: &str, key: &str| -> Vec<String> {
        out.lines()
            .filter_map(|l| l.strip_prefix(key))
            .map(str::to_string)
            .collect()
    };
    let mut deferred_culprits = field(&deferred, "culprit=");
    let mut eager_culprits = field(&eager, "culprit=");
    deferred_culprits.sort();
    eager_culprits.sort();
    assert_eq!(deferred_culprits, eager_culprits);
    assert_eq!(field(&deferred, "forest_digest="), field(&eager, "forest_digest="));
    assert_ne!(field(&deferred, "policy_digest="), field(&eager, "policy_digest="));
    assert_ne!(field(&deferred, "report_digest="), field(&eager, "report_digest="));
}
