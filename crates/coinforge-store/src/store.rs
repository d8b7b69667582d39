//! Filesystem-backed project persistence
//!
//! One JSON document per project under
//! `<COINFORGE_HOME>/projects/<owner>/<id>.json`, written atomically.
//! Listing is a directory scan; there is no index to corrupt.

use std::collections::BTreeMap;

use camino::Utf8PathBuf;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use coinforge_params::ProjectParameters;
use coinforge_task_api::GenerationResult;
use coinforge_utils::atomic_write::write_file_atomic;
use coinforge_utils::error::{StoreError, serde_error::SerializeError};
use coinforge_utils::paths::owner_root;

use crate::project_id::{ProjectId, sanitize_component};

/// A persisted generation run: the plan that produced it, the result,
/// and a content hash per artifact for later integrity checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Project {
    pub id: ProjectId,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub params: ProjectParameters,
    pub result: GenerationResult,
    /// blake3 hex digest of each result field's payload.
    pub artifact_hashes: BTreeMap<String, String>,
}

impl Project {
    /// Assemble a project record from a completed run, hashing every
    /// artifact as it is recorded.
    #[must_use]
    pub fn from_run(
        id: ProjectId,
        owner: &str,
        params: ProjectParameters,
        result: GenerationResult,
    ) -> Self {
        let artifact_hashes = result
            .iter()
            .map(|(field, payload)| {
                (
                    field.to_string(),
                    blake3::hash(payload.as_bytes()).to_hex().to_string(),
                )
            })
            .collect();
        Self {
            id,
            owner: owner.to_string(),
            created_at: Utc::now(),
            params,
            result,
            artifact_hashes,
        }
    }

    /// Fields whose stored payload no longer matches its recorded hash.
    #[must_use]
    pub fn tampered_fields(&self) -> Vec<&str> {
        self.artifact_hashes
            .iter()
            .filter(|(field, recorded)| {
                self.result.get(field).is_none_or(|payload| {
                    blake3::hash(payload.as_bytes()).to_hex().to_string() != **recorded
                })
            })
            .map(|(field, _)| field.as_str())
            .collect()
    }
}

/// Per-owner project storage rooted at the coinforge home directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectStore;

impl ProjectStore {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Persist a new project. Refuses to overwrite.
    ///
    /// # Errors
    ///
    /// `StoreError::AlreadyExists` when the owner already has a project
    /// with this id; `StoreError::Io` on filesystem failures.
    pub fn save(&self, project: &Project) -> Result<(), StoreError> {
        let path = self.project_path(&project.owner, &project.id)?;
        if path.as_std_path().exists() {
            return Err(StoreError::AlreadyExists {
                owner: project.owner.clone(),
                id: project.id.to_string(),
            });
        }

        let json = serde_json::to_string_pretty(project)
            .map_err(|e| SerializeError(e.to_string()))?;
        write_file_atomic(&path, &json).map_err(|e| StoreError::Io {
            path: path.to_string(),
            source: std::io::Error::other(e),
        })?;
        debug!(owner = %project.owner, id = %project.id, %path, "Saved project");
        Ok(())
    }

    /// Load a project by owner and id.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` when no such project exists.
    pub fn load(&self, owner: &str, id: &str) -> Result<Project, StoreError> {
        let id = ProjectId::new(id)?;
        let path = self.project_path(owner, &id)?;
        let text = std::fs::read_to_string(path.as_std_path()).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound {
                    owner: owner.to_string(),
                    id: id.to_string(),
                }
            } else {
                StoreError::Io {
                    path: path.to_string(),
                    source: e,
                }
            }
        })?;
        let project =
            serde_json::from_str(&text).map_err(|e| SerializeError(e.to_string()))?;
        Ok(project)
    }

    /// All project ids for an owner, sorted. An owner with no saved
    /// projects yields an empty list rather than an error.
    ///
    /// # Errors
    ///
    /// `StoreError::Io` on directory read failures other than absence.
    pub fn list(&self, owner: &str) -> Result<Vec<ProjectId>, StoreError> {
        let root = self.owner_dir(owner)?;
        let entries = match std::fs::read_dir(root.as_std_path()) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::Io {
                    path: root.to_string(),
                    source: e,
                });
            }
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::Io {
                path: root.to_string(),
                source: e,
            })?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(stem) = name.strip_suffix(".json")
                && let Ok(id) = ProjectId::new(stem)
            {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Delete a project.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` when no such project exists.
    pub fn delete(&self, owner: &str, id: &str) -> Result<(), StoreError> {
        let id = ProjectId::new(id)?;
        let path = self.project_path(owner, &id)?;
        std::fs::remove_file(path.as_std_path()).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound {
                    owner: owner.to_string(),
                    id: id.to_string(),
                }
            } else {
                StoreError::Io {
                    path: path.to_string(),
                    source: e,
                }
            }
        })?;
        debug!(owner, id = %id, "Deleted project");
        Ok(())
    }

    fn owner_dir(&self, owner: &str) -> Result<Utf8PathBuf, StoreError> {
        let owner = sanitize_component(owner)?;
        Ok(owner_root(&owner))
    }

    fn project_path(&self, owner: &str, id: &ProjectId) -> Result<Utf8PathBuf, StoreError> {
        Ok(self.owner_dir(owner)?.join(format!("{id}.json")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinforge_utils::paths::with_isolated_home;

    fn sample_project(id: &str, owner: &str) -> Project {
        let params = ProjectParameters::minimal_for_testing("NovaCoin", "NVC");
        let mut result = GenerationResult::new();
        result.insert("whitepaper", "# NovaCoin");
        result.insert("tokenomics", "| epoch | reward |");
        Project::from_run(ProjectId::new(id).unwrap(), owner, params, result)
    }

    #[test]
    fn save_load_round_trip() {
        let _home = with_isolated_home();
        let store = ProjectStore::new();
        let project = sample_project("novacoin", "alice");
        store.save(&project).unwrap();

        let loaded = store.load("alice", "novacoin").unwrap();
        assert_eq!(loaded.id, project.id);
        assert_eq!(loaded.result.get("whitepaper"), Some("# NovaCoin"));
        assert_eq!(loaded.artifact_hashes.len(), 2);
        assert!(loaded.tampered_fields().is_empty());
    }

    #[test]
    fn save_refuses_to_overwrite() {
        let _home = with_isolated_home();
        let store = ProjectStore::new();
        let project = sample_project("novacoin", "alice");
        store.save(&project).unwrap();
        assert!(matches!(
            store.save(&project),
            Err(StoreError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn load_missing_project_is_not_found() {
        let _home = with_isolated_home();
        let store = ProjectStore::new();
        assert!(matches!(
            store.load("alice", "ghost"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn owners_are_isolated() {
        let _home = with_isolated_home();
        let store = ProjectStore::new();
        store.save(&sample_project("novacoin", "alice")).unwrap();

        assert!(matches!(
            store.load("bob", "novacoin"),
            Err(StoreError::NotFound { .. })
        ));
        assert!(store.list("bob").unwrap().is_empty());
    }

    #[test]
    fn list_is_sorted() {
        let _home = with_isolated_home();
        let store = ProjectStore::new();
        store.save(&sample_project("zcoin", "alice")).unwrap();
        store.save(&sample_project("acoin", "alice")).unwrap();

        let ids: Vec<String> = store
            .list("alice")
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(ids, vec!["acoin", "zcoin"]);
    }

    #[test]
    fn delete_removes_the_project() {
        let _home = with_isolated_home();
        let store = ProjectStore::new();
        store.save(&sample_project("novacoin", "alice")).unwrap();
        store.delete("alice", "novacoin").unwrap();
        assert!(matches!(
            store.load("alice", "novacoin"),
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.delete("alice", "novacoin"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn tampering_is_detectable() {
        let _home = with_isolated_home();
        let mut project = sample_project("novacoin", "alice");
        project.result.insert("whitepaper", "edited after the fact");
        assert_eq!(project.tampered_fields(), vec!["whitepaper"]);
    }
}
