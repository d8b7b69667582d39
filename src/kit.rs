//! Launch kit output
//!
//! Writes every generated artifact to a directory under a conventional
//! file name, plus a `manifest.json` recording what was written and the
//! blake3 digest of each file so a kit can be verified later.

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use coinforge_task_api::GenerationResult;
use coinforge_utils::atomic_write::write_file_atomic;
use coinforge_utils::error::{CoinforgeError, ValidationError};

/// File name a result field is written under inside the kit.
#[must_use]
pub fn artifact_filename(field: &str) -> String {
    match field {
        "whitepaper" => "whitepaper.md".to_string(),
        "tokenomics" => "tokenomics.md".to_string(),
        "community_strategy" => "community-strategy.md".to_string(),
        "logo_data_uri" => "logo.uri".to_string(),
        "genesis_block" => "genesis-block.json".to_string(),
        "network_config" => "network-config.toml".to_string(),
        "compilation_guide" => "compilation-guide.md".to_string(),
        "pitch_deck" => "pitch-deck.md".to_string(),
        "social_campaign" => "social-campaign.md".to_string(),
        "landing_page" => "index.html".to_string(),
        "node_setup" => "node-setup.md".to_string(),
        other => format!("{}.txt", other.replace('_', "-")),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KitManifest {
    pub project: String,
    pub generated_at: DateTime<Utc>,
    pub files: Vec<KitFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KitFile {
    pub field: String,
    pub file: String,
    pub bytes: usize,
    pub blake3: String,
}

/// Write every artifact plus the manifest into `dir`, creating it as
/// needed. Returns the manifest that was written.
///
/// # Errors
///
/// Returns `CoinforgeError::Io` when any file cannot be written.
pub fn write_kit(
    dir: &Utf8Path,
    project: &str,
    result: &GenerationResult,
) -> Result<KitManifest, CoinforgeError> {
    let mut files = Vec::with_capacity(result.len());
    for (field, payload) in result.iter() {
        let name = artifact_filename(field);
        let path = dir.join(&name);
        write_file_atomic(&path, payload).map_err(io_other)?;
        files.push(KitFile {
            field: field.to_string(),
            file: name,
            bytes: payload.len(),
            blake3: blake3::hash(payload.as_bytes()).to_hex().to_string(),
        });
    }

    let manifest = KitManifest {
        project: project.to_string(),
        generated_at: Utc::now(),
        files,
    };
    let json = serde_json::to_string_pretty(&manifest)
        .map_err(|e| CoinforgeError::Io(std::io::Error::other(e)))?;
    write_file_atomic(&dir.join("manifest.json"), &json).map_err(io_other)?;

    info!(%dir, files = manifest.files.len(), "Wrote launch kit");
    Ok(manifest)
}

/// Load a kit manifest back from a kit directory.
///
/// # Errors
///
/// Returns `CoinforgeError::Io` when the manifest is missing or invalid.
pub fn read_manifest(dir: &Utf8Path) -> Result<KitManifest, CoinforgeError> {
    let path = dir.join("manifest.json");
    let text = std::fs::read_to_string(path.as_std_path())?;
    serde_json::from_str(&text).map_err(|e| CoinforgeError::Io(std::io::Error::other(e)))
}

/// Check every artifact in a kit directory against its manifest digests.
///
/// # Errors
///
/// Returns `CoinforgeError::Io` when the manifest itself is missing or
/// unreadable, and `CoinforgeError::Validation` when any listed file is
/// missing or no longer matches its recorded digest.
pub fn verify_kit(dir: &Utf8Path) -> Result<KitManifest, CoinforgeError> {
    let manifest = read_manifest(dir)?;
    let mut damaged = Vec::new();
    for file in &manifest.files {
        match std::fs::read_to_string(dir.join(&file.file).as_std_path()) {
            Ok(text) if blake3::hash(text.as_bytes()).to_hex().to_string() == file.blake3 => {}
            Ok(_) => damaged.push(format!("{} (modified)", file.file)),
            Err(_) => damaged.push(format!("{} (missing)", file.file)),
        }
    }
    if damaged.is_empty() {
        Ok(manifest)
    } else {
        Err(ValidationError::KitDamaged {
            kit_dir: dir.to_string(),
            details: damaged.join(", "),
        }
        .into())
    }
}

/// Directory the completed artifacts of a failed run are written to,
/// beside the kit directory a successful run would use.
#[must_use]
pub fn partial_kit_dir(kit_dir: &Utf8Path) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{kit_dir}.partial"))
}

/// Default kit directory for a project when neither the CLI nor the
/// configuration names one.
#[must_use]
pub fn default_kit_dir(project_id: &str) -> Utf8PathBuf {
    coinforge_utils::paths::kit_root(project_id)
}

fn io_other(err: anyhow::Error) -> CoinforgeError {
    CoinforgeError::Io(std::io::Error::other(err))
}
