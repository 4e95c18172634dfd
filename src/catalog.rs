//! App catalog: per-app descriptor files on disk.
//!
//! Descriptors live at `<root>/apps/<platform>/<name>.json`, one JSON file
//! per app. The root defaults to `~/.apkscout` and can be overridden with
//! `APKSCOUT_CONFIG_DIR`.

use crate::query::{AppQuery, DEFAULT_ARCH};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Platform directory used when none is given.
pub const DEFAULT_PLATFORM: &str = "apkmirror";

/// One app's resolution parameters, as stored on disk.
///
/// Unknown fields are rejected so a typo in a descriptor fails loudly
/// instead of being silently ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppDescriptor {
    /// App name as it appears in mirror URLs (e.g. "telegram").
    pub name: String,
    /// Publisher path segment (e.g. "telegram-fz-llc").
    pub org: String,
    /// Android package id, passed to version-hint tools.
    pub package: Option<String>,
    /// Release page prefix, when it differs from `name`.
    pub release_prefix: Option<String>,
    /// Preferred ABI (defaults to "universal").
    pub arch: Option<String>,
    /// Screen density filter (e.g. "nodpi").
    pub dpi: Option<String>,
    /// Build type filter (e.g. "apk", "bundle").
    pub build_type: Option<String>,
    /// Pinned version; skips discovery unless overridden on the command line.
    pub version: Option<String>,
    /// External tool that reports the newest upstream version.
    pub hint_tool: Option<HintTool>,
}

/// External command that prints a version string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HintTool {
    /// Binary name or absolute path.
    pub command: String,
    /// Arguments placed before the package id.
    #[serde(default)]
    pub args: Vec<String>,
}

impl AppDescriptor {
    /// Convert to a resolver query, filling defaults.
    pub fn to_query(&self) -> AppQuery {
        AppQuery {
            app: self.name.clone(),
            org: self.org.clone(),
            release_prefix: self
                .release_prefix
                .clone()
                .unwrap_or_else(|| self.name.clone()),
            version: self.version.clone(),
            arch: self.arch.clone().unwrap_or_else(|| DEFAULT_ARCH.to_string()),
            dpi: self.dpi.clone(),
            build_type: self.build_type.clone(),
            package: self.package.clone(),
        }
    }
}

/// Catalog root: `$APKSCOUT_CONFIG_DIR`, else `~/.apkscout`.
pub fn catalog_root() -> PathBuf {
    if let Ok(dir) = std::env::var("APKSCOUT_CONFIG_DIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".apkscout")
}

/// Path of one descriptor file.
pub fn descriptor_path(root: &Path, platform: &str, name: &str) -> PathBuf {
    root.join("apps").join(platform).join(format!("{name}.json"))
}

/// Load one app descriptor.
pub fn load(root: &Path, platform: &str, name: &str) -> Result<AppDescriptor> {
    let path = descriptor_path(root, platform, name);
    let data = std::fs::read_to_string(&path)
        .with_context(|| format!("reading app descriptor: {}", path.display()))?;
    let descriptor: AppDescriptor = serde_json::from_str(&data)
        .with_context(|| format!("parsing app descriptor: {}", path.display()))?;
    Ok(descriptor)
}

/// List descriptor names for a platform, sorted. A missing directory is an
/// empty catalog, not an error.
pub fn list(root: &Path, platform: &str) -> Result<Vec<String>> {
    let dir = root.join("apps").join(platform);
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let entries =
        std::fs::read_dir(&dir).with_context(|| format!("listing catalog: {}", dir.display()))?;

    let mut names = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.extension().is_some_and(|e| e == "json") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}
