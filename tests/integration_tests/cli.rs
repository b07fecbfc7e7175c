//! End-to-end tests of the `repoinfo` binary.

use rstest::rstest;

use crate::common::{TestRepo, repo, repo_with_remote, stderr, stdout};

#[rstest]
fn test_text_output(#[from(repo_with_remote)] repo: TestRepo) {
    repo.write_file("src/a.go", "package main\n");

    let output = repo.repoinfo(&["src/a.go"]);
    assert!(output.status.success(), "{}", stderr(&output));
    insta::assert_snapshot!(stdout(&output), @r"
    file: src/a.go
    vcs: git
    remote-url: https://github.com/acme/widgets.git
    branch: main
    relative-path: src/a.go
    ");
}

#[rstest]
fn test_json_output(#[from(repo_with_remote)] repo: TestRepo) {
    repo.write_file("src/a.go", "package main\n");

    let output = repo.repoinfo(&["--json", "src/a.go"]);
    assert!(output.status.success(), "{}", stderr(&output));
    insta::assert_snapshot!(stdout(&output), @r#"
    [
      {
        "file": "src/a.go",
        "vcs_type": "git",
        "remote_url": "https://github.com/acme/widgets.git",
        "branch_name": "main",
        "relative_path": "src/a.go"
      }
    ]
    "#);
}

#[rstest]
fn test_multiple_files(#[from(repo_with_remote)] repo: TestRepo) {
    repo.write_file("a.txt", "");
    repo.write_file("docs/b.md", "");

    let output = repo.repoinfo(&["a.txt", "docs/b.md"]);
    assert!(output.status.success(), "{}", stderr(&output));
    insta::assert_snapshot!(stdout(&output), @r"
    file: a.txt
    vcs: git
    remote-url: https://github.com/acme/widgets.git
    branch: main
    relative-path: a.txt

    file: docs/b.md
    vcs: git
    remote-url: https://github.com/acme/widgets.git
    branch: main
    relative-path: docs/b.md
    ");
}

#[rstest]
fn test_default_branch_flag(#[from(repo_with_remote)] repo: TestRepo) {
    repo.checkout_new_branch("feature-x");
    repo.write_file("a.txt", "");

    let output = repo.repoinfo(&["--json", "a.txt"]);
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value[0]["branch_name"], "main");

    let output = repo.repoinfo(&["--json", "--default-branch", "trunk", "a.txt"]);
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value[0]["branch_name"], "trunk");
}

#[rstest]
fn test_blank_default_branch_flag_is_rejected(#[from(repo_with_remote)] repo: TestRepo) {
    repo.write_file("a.txt", "");

    let output = repo.repoinfo(&["--default-branch", "", "a.txt"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(
        stderr(&output).contains("✗ --default-branch cannot be empty"),
        "{}",
        stderr(&output)
    );
}

#[rstest]
fn test_replacements_from_config_and_flag(#[from(repo_with_remote)] repo: TestRepo) {
    repo.write_file("a.txt", "");
    repo.write_config(
        r#"remote-url-replacements = "github.com/acme, git.example.com/mirror"
"#,
    );

    let output = repo.repoinfo(&["--json", "a.txt"]);
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        value[0]["remote_url"],
        "https://git.example.com/mirror/widgets.git"
    );

    // The flag replaces the configured list; an odd list disables rewriting
    let output = repo.repoinfo(&["--json", "--replacements", "a,b,c", "a.txt"]);
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value[0]["remote_url"], "https://github.com/acme/widgets.git");
}

#[rstest]
fn test_project_config_overrides_global(#[from(repo_with_remote)] repo: TestRepo) {
    repo.checkout_new_branch("topic");
    repo.write_file("a.txt", "");
    repo.write_config(
        r#"
default-branch = "develop"

[projects."~/repo"]
default-branch = "master"
"#,
    );

    let output = repo.repoinfo(&["--json", "a.txt"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value[0]["branch_name"], "master");
}

#[rstest]
fn test_env_default_branch(#[from(repo_with_remote)] repo: TestRepo) {
    repo.checkout_new_branch("topic");
    repo.write_file("a.txt", "");

    let output = repo
        .repoinfo_command()
        .args(["--json", "a.txt"])
        .env("REPOINFO_DEFAULT_BRANCH", "stable")
        .output()
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value[0]["branch_name"], "stable");
}

#[rstest]
fn test_missing_remote_notifies_once(repo: TestRepo) {
    repo.write_file("src/lib.rs", "");

    let output = repo.repoinfo(&["src/lib.rs"]);
    // Failures are reported but not fatal without --strict
    assert!(output.status.success());
    insta::assert_snapshot!(stdout(&output), @r"
    file: src/lib.rs
    vcs: git
    remote-url:
    branch: main
    relative-path: src/lib.rs
    ");

    let stderr = stderr(&output);
    assert_eq!(stderr.matches('✗').count(), 1, "{stderr}");
    assert!(
        stderr.contains(
            "✗ Error determining repository info: No URL configured for remote 'origin' in ~/repo"
        ),
        "{stderr}"
    );
}

#[rstest]
fn test_strict_exit_code(repo: TestRepo) {
    repo.write_file("a.txt", "");
    let output = repo.repoinfo(&["--strict", "a.txt"]);
    assert_eq!(output.status.code(), Some(1));
    // Partial information is still printed
    assert!(stdout(&output).contains("relative-path: a.txt"));
}

#[rstest]
fn test_file_outside_repository(repo: TestRepo) {
    let file = repo.outside_path().join("notes.txt");
    std::fs::write(&file, "").unwrap();

    let output = repo.repoinfo(&["--strict", file.to_str().unwrap()]);
    assert!(output.status.success(), "{}", stderr(&output));
    insta::assert_snapshot!(stdout(&output), @r"
    file: ~/scratch/notes.txt
    vcs: unknown
    remote-url:
    branch:
    relative-path:
    ");
}

#[rstest]
fn test_unsupported_vcs(repo: TestRepo) {
    let hg_root = repo.outside_path();
    std::fs::create_dir(hg_root.join(".hg")).unwrap();
    let file = hg_root.join("setup.py");
    std::fs::write(&file, "").unwrap();

    let output = repo.repoinfo(&[file.to_str().unwrap()]);
    assert!(
        stderr(&output).contains("Error determining repository info: Unsupported VCS: Mercurial"),
        "{}",
        stderr(&output)
    );
    assert!(stdout(&output).contains("relative-path: setup.py"));
}

#[rstest]
fn test_invalid_config_is_fatal(repo: TestRepo) {
    repo.write_file("a.txt", "");
    repo.write_config("default-branch = [\n");

    let output = repo.repoinfo(&["a.txt"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(
        stderr(&output).contains("Failed to parse config file ~/test-config.toml"),
        "{}",
        stderr(&output)
    );
}

#[rstest]
fn test_config_flag_overrides_env_path(#[from(repo_with_remote)] repo: TestRepo) {
    repo.checkout_new_branch("topic");
    repo.write_file("a.txt", "");
    let explicit = repo.home_path().join("explicit.toml");
    std::fs::write(&explicit, "default-branch = \"from-flag\"\n").unwrap();

    let output = repo.repoinfo(&["--json", "--config", explicit.to_str().unwrap(), "a.txt"]);
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value[0]["branch_name"], "from-flag");
}

#[test]
fn test_help() {
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_repoinfo"))
        .arg("--help")
        .env("NO_COLOR", "1")
        .output()
        .unwrap();
    assert!(output.status.success());
    let help = stdout(&output);
    for flag in ["--json", "--default-branch", "--replacements", "--config", "--strict"] {
        assert!(help.contains(flag), "missing {flag}:\n{help}");
    }
}
