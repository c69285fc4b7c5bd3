//! Package manifest version handling.
//!
//! Reads and rewrites the version of a Cargo manifest with `toml_edit` so that
//! comments, ordering and formatting of the file survive the bump.

use std::fs;
use std::path::{Path, PathBuf};

use semver::Version;
use toml_edit::{DocumentMut, Item};
use tracing::debug;

use crate::error::{ReleaseError, Result};
use crate::version::parse_version;

/// Where the authoritative version of a manifest lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionLocation {
    /// `[workspace.package].version`, inherited by members
    WorkspacePackage,
    /// `[package].version`
    Package,
}

/// A Cargo manifest loaded for version editing.
#[derive(Debug)]
pub struct Manifest {
    path: PathBuf,
    doc: DocumentMut,
}

impl Manifest {
    /// Loads and parses a manifest.
    ///
    /// A missing file is invalid input: there is nothing to release.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ReleaseError::invalid_input(format!(
                "No manifest found at '{}'",
                path.display()
            )));
        }
        let content = fs::read_to_string(path)?;
        let doc = content.parse::<DocumentMut>().map_err(|e| {
            ReleaseError::invalid_input(format!("Failed to parse '{}': {}", path.display(), e))
        })?;
        Ok(Manifest {
            path: path.to_path_buf(),
            doc,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Locates the version field, preferring `[workspace.package]`.
    pub fn version_location(&self) -> Option<VersionLocation> {
        if literal_version(self.doc.get("workspace").and_then(|w| w.get("package"))).is_some() {
            Some(VersionLocation::WorkspacePackage)
        } else if literal_version(self.doc.get("package")).is_some() {
            Some(VersionLocation::Package)
        } else {
            None
        }
    }

    /// Returns the current version of the manifest.
    pub fn version(&self) -> Result<Version> {
        let raw = match self.version_location() {
            Some(VersionLocation::WorkspacePackage) => {
                literal_version(self.doc.get("workspace").and_then(|w| w.get("package")))
            }
            Some(VersionLocation::Package) => literal_version(self.doc.get("package")),
            None => None,
        };
        let raw = raw.ok_or_else(|| {
            ReleaseError::invalid_input(format!(
                "'{}' has no [package] or [workspace.package] version",
                self.path.display()
            ))
        })?;
        parse_version(raw)
    }

    /// Replaces the version in memory. Call [`Manifest::save`] to persist it.
    pub fn set_version(&mut self, version: &Version) -> Result<()> {
        let table = match self.version_location() {
            Some(VersionLocation::WorkspacePackage) => self
                .doc
                .get_mut("workspace")
                .and_then(|w| w.get_mut("package")),
            Some(VersionLocation::Package) => self.doc.get_mut("package"),
            None => None,
        };
        let table = table.and_then(Item::as_table_like_mut).ok_or_else(|| {
            ReleaseError::invalid_input(format!(
                "'{}' has no version to update",
                self.path.display()
            ))
        })?;
        replace_version(table, version);
        Ok(())
    }

    /// Rewrites a literal `[package].version` that still reads `from`.
    fn bump_package_pin(&mut self, from: &Version, to: &Version) -> bool {
        let pinned = literal_version(self.doc.get("package"))
            .and_then(|raw| parse_version(raw).ok())
            .map_or(false, |v| v == *from);
        if !pinned {
            return false;
        }
        match self.doc.get_mut("package").and_then(Item::as_table_like_mut) {
            Some(table) => {
                replace_version(table, to);
                true
            }
            None => false,
        }
    }

    /// Writes the manifest back to disk.
    pub fn save(&self) -> Result<()> {
        fs::write(&self.path, self.doc.to_string())?;
        Ok(())
    }

    /// Workspace member directories declared in `[workspace].members`.
    ///
    /// Literal paths are taken as-is; a trailing `/*` expands to every
    /// subdirectory that holds a `Cargo.toml`. Other glob forms are skipped.
    pub fn member_manifests(&self) -> Result<Vec<PathBuf>> {
        let root = self.path.parent().unwrap_or_else(|| Path::new("."));
        let members = match self
            .doc
            .get("workspace")
            .and_then(|w| w.get("members"))
            .and_then(Item::as_array)
        {
            Some(members) => members,
            None => return Ok(Vec::new()),
        };

        let mut manifests = Vec::new();
        for member in members.iter().filter_map(|m| m.as_str()) {
            if let Some(prefix) = member.strip_suffix("/*") {
                let dir = root.join(prefix);
                if !dir.is_dir() {
                    continue;
                }
                let mut found: Vec<PathBuf> = fs::read_dir(&dir)?
                    .filter_map(|entry| entry.ok())
                    .map(|entry| entry.path().join("Cargo.toml"))
                    .filter(|p| p.is_file())
                    .collect();
                found.sort();
                manifests.extend(found);
            } else if member.contains('*') || member.contains('?') || member.contains('[') {
                debug!(member, "skipping unsupported workspace member glob");
            } else {
                let path = root.join(member).join("Cargo.toml");
                if path.is_file() {
                    manifests.push(path);
                }
            }
        }
        Ok(manifests)
    }
}

fn literal_version(table: Option<&Item>) -> Option<&str> {
    table?.get("version")?.as_str()
}

fn replace_version(table: &mut dyn toml_edit::TableLike, version: &Version) {
    match table.get_mut("version").and_then(Item::as_value_mut) {
        Some(value) => {
            let decor = value.decor().clone();
            *value = toml_edit::Value::from(version.to_string());
            *value.decor_mut() = decor;
        }
        None => {
            table.insert("version", toml_edit::value(version.to_string()));
        }
    }
}

/// Bumps a manifest and its workspace members from `from` to `to`.
///
/// Members are rewritten only when they pin a literal version equal to
/// `from`; members with `version.workspace = true` inherit the new version.
/// A root that carries both `[workspace.package]` and its own pinned
/// `[package]` version gets both rewritten.
///
/// Every manifest is loaded and edited before any of them is written, so a
/// member that fails to parse leaves all files untouched.
/// Returns every file that was written.
pub fn rewrite_version(path: &Path, from: &Version, to: &Version) -> Result<Vec<PathBuf>> {
    let mut root = Manifest::load(path)?;
    let current = root.version()?;
    if &current != from {
        return Err(ReleaseError::invalid_input(format!(
            "'{}' is at version {}, expected {}",
            path.display(),
            current,
            from
        )));
    }

    root.set_version(to)?;
    if root.version_location() == Some(VersionLocation::WorkspacePackage)
        && root.bump_package_pin(from, to)
    {
        debug!(manifest = %root.path().display(), "bumped root package version");
    }

    let members = root.member_manifests()?;
    let root_file = fs::canonicalize(root.path())?;
    let mut pending = vec![root];

    for member_path in members {
        if fs::canonicalize(&member_path)? == root_file {
            continue;
        }
        let mut member = Manifest::load(&member_path)?;
        if member.version_location() != Some(VersionLocation::Package) {
            continue;
        }
        if member.version()? == *from {
            member.set_version(to)?;
            pending.push(member);
        }
    }

    for manifest in &pending {
        manifest.save()?;
        debug!(manifest = %manifest.path().display(), "wrote bumped version");
    }

    Ok(pending.into_iter().map(|m| m.path).collect())
}
