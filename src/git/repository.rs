use std::path::Path;

use git2::{
    Cred, CredentialType, ErrorClass, ErrorCode, PushOptions, RemoteCallbacks,
    Repository as Git2Repo, StatusOptions,
};
use tracing::debug;

use crate::error::{ReleaseError, Result};
use crate::git::HeadInfo;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    ///
    /// Walks up from `path` until a repository is found.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let repo = Git2Repo::discover(path).map_err(|e| {
            ReleaseError::environment(format!(
                "Not in a git repository ({}): {}",
                path.display(),
                e.message()
            ))
        })?;
        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    fn head_commit(&self) -> Result<git2::Commit<'_>> {
        let head = self.repo.head().map_err(|e| match e.code() {
            ErrorCode::UnbornBranch | ErrorCode::NotFound => {
                ReleaseError::environment("Repository has no commits yet")
            }
            _ => ReleaseError::Git(e),
        })?;
        Ok(head.peel_to_commit()?)
    }

    fn push_refspec(&self, remote_name: &str, refspec: &str) -> Result<()> {
        let mut remote = self
            .repo
            .find_remote(remote_name)
            .map_err(|_| ReleaseError::vcs(format!("No remote named '{}' found", remote_name)))?;

        let config = self.repo.config()?;
        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(|url, username_from_url, allowed_types| {
            let username = username_from_url.unwrap_or("git");
            if allowed_types.contains(CredentialType::SSH_KEY) {
                if let Ok(cred) = Cred::ssh_key_from_agent(username) {
                    return Ok(cred);
                }
                if let Some(home) = dirs::home_dir() {
                    for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                        let path = home.join(".ssh").join(key);
                        if path.exists() {
                            if let Ok(cred) = Cred::ssh_key(username, None, &path, None) {
                                return Ok(cred);
                            }
                        }
                    }
                }
            }
            if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
                if let Ok(cred) = Cred::credential_helper(&config, url, username_from_url) {
                    return Ok(cred);
                }
            }
            Cred::default()
        });

        // The server can reject a single ref while the transport still succeeds.
        callbacks.push_update_reference(|refname, status| match status {
            Some(status) => Err(git2::Error::from_str(&format!(
                "remote rejected {}: {}",
                refname, status
            ))),
            None => Ok(()),
        });

        let mut push_options = PushOptions::new();
        push_options.remote_callbacks(callbacks);

        debug!(remote = remote_name, refspec, "pushing");
        remote
            .push(&[refspec], Some(&mut push_options))
            .map_err(|e| match e.class() {
                ErrorClass::Net => ReleaseError::vcs(format!(
                    "Network error pushing {} to '{}': {}",
                    refspec,
                    remote_name,
                    e.message()
                )),
                _ => ReleaseError::vcs(format!(
                    "Failed to push {} to '{}': {}",
                    refspec,
                    remote_name,
                    e.message()
                )),
            })
    }
}

impl super::Repository for Git2Repository {
    fn head_info(&self) -> Result<HeadInfo> {
        let commit = self.head_commit()?;
        let short = commit.as_object().short_id()?;
        let short_hash = short
            .as_str()
            .ok_or_else(|| ReleaseError::vcs("Abbreviated commit id is not valid UTF-8"))?
            .to_string();
        let time = commit.committer().when();

        Ok(HeadInfo {
            short_hash,
            time: time.seconds(),
            offset_minutes: time.offset_minutes(),
        })
    }

    fn is_dirty(&self) -> Result<bool> {
        let mut options = StatusOptions::new();
        options
            .include_untracked(false)
            .include_ignored(false)
            .exclude_submodules(true);
        let statuses = self.repo.statuses(Some(&mut options))?;
        Ok(statuses
            .iter()
            .any(|entry| entry.status() != git2::Status::CURRENT))
    }

    fn current_branch(&self) -> Result<String> {
        let head = self.repo.head()?;
        if !head.is_branch() {
            return Err(ReleaseError::vcs("HEAD is detached, no branch to push"));
        }
        head.shorthand()
            .map(|s| s.to_string())
            .ok_or_else(|| ReleaseError::vcs("Branch name is not valid UTF-8"))
    }

    fn tag_exists(&self, name: &str) -> Result<bool> {
        match self.repo.find_reference(&format!("refs/tags/{}", name)) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn commit_all(&self, message: &str) -> Result<String> {
        // Tracked files only, like `git commit -a`; untracked files stay out
        let mut index = self.repo.index()?;
        index.update_all(["*"].iter(), None)?;
        index.write()?;

        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;

        let parent = match self.head_commit() {
            Ok(commit) => Some(commit),
            Err(ReleaseError::Environment(_)) => None,
            Err(e) => return Err(e),
        };
        if let Some(parent) = &parent {
            if parent.tree_id() == tree_id {
                return Err(ReleaseError::vcs("Nothing to commit, working tree clean"));
            }
        }

        let signature = self.repo.signature().map_err(|e| {
            ReleaseError::vcs(format!("Cannot determine commit author: {}", e.message()))
        })?;
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;

        Ok(oid.to_string())
    }

    fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()> {
        let head = self.head_commit()?;
        let signature = self.repo.signature().map_err(|e| {
            ReleaseError::vcs(format!("Cannot determine tagger: {}", e.message()))
        })?;
        self.repo
            .tag(name, head.as_object(), &signature, message, false)
            .map_err(|e| match e.code() {
                ErrorCode::Exists => ReleaseError::vcs(format!("Tag '{}' already exists", name)),
                _ => ReleaseError::Git(e),
            })?;
        Ok(())
    }

    fn push_branch(&self, remote: &str, branch: &str) -> Result<()> {
        let refspec = format!("refs/heads/{0}:refs/heads/{0}", branch);
        self.push_refspec(remote, &refspec)
    }

    fn push_tag(&self, remote: &str, tag: &str) -> Result<()> {
        let refspec = format!("refs/tags/{0}:refs/tags/{0}", tag);
        self.push_refspec(remote, &refspec)
    }
}
