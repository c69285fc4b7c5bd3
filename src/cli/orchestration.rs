//! Release and build workflow orchestration
//!
//! Each workflow is an ordered pipeline of fallible steps. The first failing
//! step ends the run; earlier side effects (a rewritten manifest, a commit,
//! a tag) are left in place for the operator to inspect.

use std::path::{Path, PathBuf};

use semver::Version;
use tracing::{info, info_span};

use crate::config::{render_template, BuildConfig, Config, ReleaseConfig};
use crate::error::{ReleaseError, Result};
use crate::gate::{self, GateStep, StepExecutor};
use crate::git::Repository;
use crate::manifest::{self, Manifest};
use crate::revision::{self, Revision};
use crate::ui;
use crate::version::BumpLevel;

/// Arguments for the release workflow
///
/// Mirrors the CLI flags so the workflow can be driven without clap.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseArgs {
    pub level: BumpLevel,
    pub manifest_path: PathBuf,
    /// Remote override; `None` uses the configured remote
    pub remote: Option<String>,
    /// Skip both branch and tag pushes
    pub no_push: bool,
    /// Preview only, no side effects
    pub dry_run: bool,
    /// Run the pre-commit checks before touching the manifest
    pub run_checks: bool,
}

impl ReleaseArgs {
    pub fn new(level: BumpLevel, manifest_path: impl Into<PathBuf>) -> Self {
        ReleaseArgs {
            level,
            manifest_path: manifest_path.into(),
            remote: None,
            no_push: false,
            dry_run: false,
            run_checks: false,
        }
    }
}

/// Everything a release will do, computed before any side effect
#[derive(Debug, Clone, PartialEq)]
pub struct ReleasePlan {
    pub current: Version,
    pub next: Version,
    pub commit_message: String,
    pub tag_name: String,
    pub tag_message: String,
    /// Remote to push to, `None` when pushing is disabled
    pub remote: Option<String>,
    /// Branch pushed right after the release commit
    pub push_branch: Option<String>,
}

/// Result of a release workflow
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowResult {
    pub version: Version,
    pub tag: String,
    /// Id of the release commit, `None` on a dry run
    pub commit: Option<String>,
    pub branch_pushed: bool,
    pub tag_pushed: bool,
}

/// Computes the release plan without side effects.
///
/// Fails when the manifest is missing or has no version, when the tag for
/// the next version already exists, or when a branch push is requested from
/// a detached HEAD.
pub fn plan_release<R: Repository + ?Sized>(
    repo: &R,
    args: &ReleaseArgs,
    config: &ReleaseConfig,
) -> Result<ReleasePlan> {
    let current = Manifest::load(&args.manifest_path)?.version()?;
    let next = args.level.apply(&current);
    let version = next.to_string();

    let tag_name = render_template(&config.tag_name, &version);
    if repo.tag_exists(&tag_name)? {
        return Err(ReleaseError::vcs(format!(
            "Tag '{}' already exists, refusing to release {} again",
            tag_name, version
        )));
    }

    let remote = if args.no_push {
        None
    } else {
        Some(args.remote.clone().unwrap_or_else(|| config.remote.clone()))
    };
    let push_branch = if remote.is_some() && config.push_branch {
        Some(repo.current_branch()?)
    } else {
        None
    };

    Ok(ReleasePlan {
        current,
        next,
        commit_message: render_template(&config.commit_message, &version),
        tag_name,
        tag_message: render_template(&config.tag_message, &version),
        remote,
        push_branch,
    })
}

/// Applies a plan: manifest, commit, branch push, tag, tag push.
///
/// No rollback happens on failure.
pub fn execute_release<R: Repository + ?Sized>(
    repo: &R,
    plan: &ReleasePlan,
    manifest_path: &Path,
) -> Result<WorkflowResult> {
    let span = info_span!("release", version = %plan.next);
    let _enter = span.enter();

    ui::display_status(&format!("Bumping manifest to {}", plan.next));
    let written = manifest::rewrite_version(manifest_path, &plan.current, &plan.next)?;
    info!(files = written.len(), "manifest rewritten");

    let recorded = Manifest::load(manifest_path)?.version()?;
    if recorded != plan.next {
        return Err(ReleaseError::invalid_input(format!(
            "Manifest reports {} after bump, expected {}",
            recorded, plan.next
        )));
    }

    ui::display_status(&format!("Committing: {}", plan.commit_message));
    let commit = repo.commit_all(&plan.commit_message)?;
    info!(commit = %commit, "release committed");

    let mut branch_pushed = false;
    if let (Some(remote), Some(branch)) = (&plan.remote, &plan.push_branch) {
        ui::display_status(&format!("Pushing branch {} to {}", branch, remote));
        repo.push_branch(remote, branch)?;
        branch_pushed = true;
    }

    ui::display_status(&format!("Creating tag: {}", plan.tag_name));
    repo.create_annotated_tag(&plan.tag_name, &plan.tag_message)?;
    ui::display_success(&format!("Created tag: {}", plan.tag_name));

    let mut tag_pushed = false;
    if let Some(remote) = &plan.remote {
        ui::display_status(&format!("Pushing tag {} to {}", plan.tag_name, remote));
        repo.push_tag(remote, &plan.tag_name)?;
        ui::display_success(&format!("Pushed tag {} to {}", plan.tag_name, remote));
        tag_pushed = true;
    }

    Ok(WorkflowResult {
        version: plan.next.clone(),
        tag: plan.tag_name.clone(),
        commit: Some(commit),
        branch_pushed,
        tag_pushed,
    })
}

/// Main release workflow
///
/// 1. Plan: read the manifest, compute the next version, check the tag is free
/// 2. Optionally run the pre-commit checks
/// 3. Rewrite manifest, commit, push branch, tag, push tag
pub fn run_release_workflow<R: Repository + ?Sized>(
    repo: &R,
    args: &ReleaseArgs,
    config: &Config,
) -> Result<WorkflowResult> {
    let plan = plan_release(repo, args, &config.release)?;
    ui::display_release_plan(&plan, args.dry_run);

    if args.dry_run {
        return Ok(WorkflowResult {
            version: plan.next,
            tag: plan.tag_name,
            commit: None,
            branch_pushed: false,
            tag_pushed: false,
        });
    }

    if args.run_checks {
        gate::run_steps(&GateStep::from_configs(&config.precommit.checks)?)?;
    }

    execute_release(repo, &plan, &args.manifest_path)
}

/// Composes the revision and runs the build command with it exported.
pub fn run_build_workflow<R: Repository + ?Sized>(repo: &R, config: &BuildConfig) -> Result<Revision> {
    let revision = revision::compose(repo)?;
    let step = GateStep::from_command("build", &config.command)
        .ok_or_else(|| ReleaseError::config("build.command must not be empty"))?
        .with_env(config.revision_env.clone(), revision.to_string());

    ui::display_status(&format!("Building {} with {}={}", step, config.revision_env, revision));
    StepExecutor::execute(&step)?;
    Ok(revision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::git::{MockFailure, MockRepository, Operation};
    use std::fs;
    use tempfile::TempDir;

    fn manifest(dir: &TempDir, version: &str) -> PathBuf {
        let path = dir.path().join("Cargo.toml");
        fs::write(
            &path,
            format!("[package]\nname = \"demo\"\nversion = \"{}\"\n", version),
        )
        .unwrap();
        path
    }

    #[test]
    fn test_plan_patch_release() {
        let dir = TempDir::new().unwrap();
        let path = manifest(&dir, "1.2.3");
        let repo = MockRepository::new();

        let plan = plan_release(
            &repo,
            &ReleaseArgs::new(BumpLevel::Patch, &path),
            &ReleaseConfig::default(),
        )
        .unwrap();

        assert_eq!(plan.next, Version::new(1, 2, 4));
        assert_eq!(plan.commit_message, "chore(release): Release v1.2.4");
        assert_eq!(plan.tag_name, "v1.2.4");
        assert_eq!(plan.tag_message, "Release v1.2.4");
        assert_eq!(plan.remote.as_deref(), Some("origin"));
        assert_eq!(plan.push_branch.as_deref(), Some("main"));
    }

    #[test]
    fn test_plan_no_push() {
        let dir = TempDir::new().unwrap();
        let path = manifest(&dir, "1.2.3");
        let repo = MockRepository::new();
        let mut args = ReleaseArgs::new(BumpLevel::Minor, &path);
        args.no_push = true;

        let plan = plan_release(&repo, &args, &ReleaseConfig::default()).unwrap();

        assert_eq!(plan.remote, None);
        assert_eq!(plan.push_branch, None);
    }

    #[test]
    fn test_existing_tag_aborts_before_manifest() {
        let dir = TempDir::new().unwrap();
        let path = manifest(&dir, "1.2.3");
        let repo = MockRepository::new().with_tag("v1.3.0");

        let err = run_release_workflow(
            &repo,
            &ReleaseArgs::new(BumpLevel::Minor, &path),
            &Config::default(),
        )
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::VcsFailure);
        assert!(fs::read_to_string(&path).unwrap().contains("1.2.3"));
        assert!(repo.operations().is_empty());
    }

    #[test]
    fn test_commit_failure_stops_before_tag() {
        let dir = TempDir::new().unwrap();
        let path = manifest(&dir, "1.2.3");
        let repo = MockRepository::new().failing_on(MockFailure::Commit);

        let err = run_release_workflow(
            &repo,
            &ReleaseArgs::new(BumpLevel::Patch, &path),
            &Config::default(),
        )
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::VcsFailure);
        assert!(repo.operations().is_empty());
        assert!(!repo.tag_exists("v1.2.4").unwrap());
    }

    #[test]
    fn test_tag_failure_keeps_commit() {
        let dir = TempDir::new().unwrap();
        let path = manifest(&dir, "1.2.3");
        let repo = MockRepository::new().failing_on(MockFailure::Tag);

        assert!(run_release_workflow(
            &repo,
            &ReleaseArgs::new(BumpLevel::Patch, &path),
            &Config::default(),
        )
        .is_err());

        let operations = repo.operations();
        assert!(matches!(operations[0], Operation::Commit { .. }));
        assert!(!operations
            .iter()
            .any(|op| matches!(op, Operation::PushTag { .. })));
        assert!(fs::read_to_string(&path).unwrap().contains("1.2.4"));
    }
}
