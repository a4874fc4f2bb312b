// Model artifact persistence: the fitted scaler and classifier as JSON files.
//
// Nothing else reads these files, so the format is simply serde_json of the
// two parameter structs. There is no version tag; a file that fails to
// parse, has the wrong width, or holds unusable parameters (zero or
// negative scale, non-finite values) is treated as missing.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::logistic::LogisticRegression;
use super::scaler::StandardScaler;
use super::scorer::FEATURE_COUNT;

/// Where the two artifacts live on disk.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub scaler: PathBuf,
    pub model: PathBuf,
}

impl ArtifactPaths {
    /// Both artifacts under `dir` with their default file names.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            scaler: dir.join("scaler.json"),
            model: dir.join("churn_model.json"),
        }
    }
}

/// Load both artifacts and check they match the feature width.
pub fn load(paths: &ArtifactPaths) -> Result<(StandardScaler, LogisticRegression)> {
    let scaler: StandardScaler = read_json(&paths.scaler)?;
    let model: LogisticRegression = read_json(&paths.model)?;

    if scaler.n_features() != FEATURE_COUNT || scaler.scale.len() != FEATURE_COUNT {
        anyhow::bail!(
            "Scaler artifact {} has {} features, expected {FEATURE_COUNT}",
            paths.scaler.display(),
            scaler.n_features()
        );
    }
    if model.n_features() != FEATURE_COUNT {
        anyhow::bail!(
            "Model artifact {} has {} weights, expected {FEATURE_COUNT}",
            paths.model.display(),
            model.n_features()
        );
    }

    scaler
        .validate()
        .with_context(|| format!("Scaler artifact {} is unusable", paths.scaler.display()))?;
    model
        .validate()
        .with_context(|| format!("Model artifact {} is unusable", paths.model.display()))?;

    Ok((scaler, model))
}

/// Write both artifacts, creating parent directories as needed.
pub fn persist(
    paths: &ArtifactPaths,
    scaler: &StandardScaler,
    model: &LogisticRegression,
) -> Result<()> {
    write_json(&paths.scaler, scaler)?;
    write_json(&paths.model, model)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read artifact {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse artifact {}", path.display()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("Failed to write artifact {}", path.display()))?;
    debug!(path = %path.display(), "Wrote model artifact");
    Ok(())
}
