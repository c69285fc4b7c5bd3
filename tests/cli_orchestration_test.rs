use std::fs;
use std::path::PathBuf;

use release_kit::cli::{run_release_workflow, ReleaseArgs};
use release_kit::config::{Config, StepConfig};
use release_kit::git::{MockFailure, MockRepository, Operation, Repository};
use release_kit::version::BumpLevel;
use release_kit::ErrorKind;
use tempfile::TempDir;

fn workspace(version: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Cargo.toml");
    fs::write(
        &path,
        format!("[package]\nname = \"demo\"\nversion = \"{}\"\n", version),
    )
    .unwrap();
    (dir, path)
}

#[test]
fn test_patch_release_sequence() {
    let (_dir, path) = workspace("1.2.3");
    let repo = MockRepository::new().with_branch("main");

    let result = run_release_workflow(
        &repo,
        &ReleaseArgs::new(BumpLevel::Patch, &path),
        &Config::default(),
    )
    .unwrap();

    assert_eq!(result.version.to_string(), "1.2.4");
    assert_eq!(
        repo.operations(),
        vec![
            Operation::Commit {
                message: "chore(release): Release v1.2.4".to_string()
            },
            Operation::PushBranch {
                remote: "origin".to_string(),
                branch: "main".to_string()
            },
            Operation::Tag {
                name: "v1.2.4".to_string(),
                message: "Release v1.2.4".to_string()
            },
            Operation::PushTag {
                remote: "origin".to_string(),
                tag: "v1.2.4".to_string()
            },
        ]
    );
}

#[test]
fn test_bump_levels() {
    for (level, expected) in [
        (BumpLevel::Major, "2.0.0"),
        (BumpLevel::Minor, "1.3.0"),
        (BumpLevel::Patch, "1.2.4"),
    ] {
        let (_dir, path) = workspace("1.2.3");
        let repo = MockRepository::new();
        let result =
            run_release_workflow(&repo, &ReleaseArgs::new(level, &path), &Config::default())
                .unwrap();
        assert_eq!(result.version.to_string(), expected);
        assert!(fs::read_to_string(&path)
            .unwrap()
            .contains(&format!("version = \"{}\"", expected)));
    }
}

#[test]
fn test_branch_push_disabled_by_config() {
    let (_dir, path) = workspace("0.9.0");
    let repo = MockRepository::new();
    let mut config = Config::default();
    config.release.push_branch = false;

    let result =
        run_release_workflow(&repo, &ReleaseArgs::new(BumpLevel::Minor, &path), &config).unwrap();

    assert!(!result.branch_pushed);
    assert!(result.tag_pushed);
    assert!(!repo
        .operations()
        .iter()
        .any(|op| matches!(op, Operation::PushBranch { .. })));
}

#[test]
fn test_remote_override() {
    let (_dir, path) = workspace("0.9.0");
    let repo = MockRepository::new();
    let mut args = ReleaseArgs::new(BumpLevel::Patch, &path);
    args.remote = Some("upstream".to_string());

    run_release_workflow(&repo, &args, &Config::default()).unwrap();

    assert!(repo.operations().contains(&Operation::PushTag {
        remote: "upstream".to_string(),
        tag: "v0.9.1".to_string()
    }));
}

#[test]
fn test_missing_manifest_has_no_side_effects() {
    let dir = TempDir::new().unwrap();
    let repo = MockRepository::new();

    let err = run_release_workflow(
        &repo,
        &ReleaseArgs::new(BumpLevel::Minor, dir.path().join("Cargo.toml")),
        &Config::default(),
    )
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(repo.operations().is_empty());
}

#[test]
fn test_unreadable_member_manifest_stops_before_commit() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("Cargo.toml");
    let original = "[workspace]\nmembers = [\"broken\"]\n\n[workspace.package]\nversion = \"1.0.0\"\n";
    fs::write(&root, original).unwrap();
    fs::create_dir(dir.path().join("broken")).unwrap();
    fs::write(dir.path().join("broken/Cargo.toml"), "[package\nname = ").unwrap();
    let repo = MockRepository::new();

    let err = run_release_workflow(
        &repo,
        &ReleaseArgs::new(BumpLevel::Patch, &root),
        &Config::default(),
    )
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(repo.operations().is_empty());
    assert!(!repo.tag_exists("v1.0.1").unwrap());
    assert_eq!(fs::read_to_string(&root).unwrap(), original);
}

#[test]
fn test_tag_push_failure_is_reported() {
    let (_dir, path) = workspace("1.0.0");
    let repo = MockRepository::new().failing_on(MockFailure::PushTag);

    let err = run_release_workflow(
        &repo,
        &ReleaseArgs::new(BumpLevel::Patch, &path),
        &Config::default(),
    )
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::VcsFailure);
    assert!(repo.tag_exists("v1.0.1").unwrap());
}

#[test]
fn test_empty_check_command_is_a_config_error() {
    let (_dir, path) = workspace("1.2.3");
    let repo = MockRepository::new();
    let mut config = Config::default();
    config.precommit.checks = vec![StepConfig {
        name: "lint".to_string(),
        command: Vec::new(),
    }];
    let mut args = ReleaseArgs::new(BumpLevel::Patch, &path);
    args.run_checks = true;

    let err = run_release_workflow(&repo, &args, &config).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Config);
    assert!(err.to_string().contains("lint"));
    assert!(repo.operations().is_empty());
    assert!(fs::read_to_string(&path).unwrap().contains("1.2.3"));
}

#[cfg(unix)]
#[test]
fn test_failing_check_blocks_release() {
    let (_dir, path) = workspace("1.2.3");
    let repo = MockRepository::new();
    let mut config = Config::default();
    config.precommit.checks = vec![StepConfig {
        name: "clippy".to_string(),
        command: vec!["sh".to_string(), "-c".to_string(), "exit 1".to_string()],
    }];
    let mut args = ReleaseArgs::new(BumpLevel::Patch, &path);
    args.run_checks = true;

    let err = run_release_workflow(&repo, &args, &config).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::GateFailure);
    assert!(repo.operations().is_empty());
    assert!(fs::read_to_string(&path).unwrap().contains("1.2.3"));
}
