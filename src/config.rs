//! Configuration handling for Seedling.
//! Loads template manifests (JSON or YAML), locates the templates root and
//! provides the global fallback defaults used by the variable resolver.

use std::path::{Path, PathBuf};

use log::debug;

use crate::constants::{BUNDLED_TEMPLATES_DIR, DEFAULT_LICENSE, DEFAULT_VERSION};
use crate::error::{Error, Result};
use crate::package::PackageManager;
use crate::template::TemplateManifest;

/// Loads the manifest of a template directory, trying multiple file names.
/// Supports: template.json, template.yml, template.yaml
///
/// # Arguments
/// * `template_dir` - Directory containing the template manifest
/// * `manifest_files` - List of manifest file names to try
///
/// # Returns
/// * `Result<String>` - Contents of the first manifest found
///
/// # Errors
/// * `Error::ConfigError` if no manifest exists
pub fn load_manifest<P: AsRef<Path>>(template_dir: P, manifest_files: &[&str]) -> Result<String> {
    let template_dir = template_dir.as_ref();
    for file in manifest_files {
        let manifest_path = template_dir.join(file);
        if manifest_path.exists() {
            debug!("Loading manifest from {}", manifest_path.display());
            return Ok(std::fs::read_to_string(&manifest_path)?);
        }
    }

    Err(Error::ConfigError(format!(
        "No template manifest found in '{}' (tried: {})",
        template_dir.display(),
        manifest_files.join(", ")
    )))
}

/// Parses manifest content, trying JSON first and YAML second.
pub fn parse_manifest(content: &str) -> Result<TemplateManifest> {
    match serde_json::from_str(content) {
        Ok(manifest) => Ok(manifest),
        Err(_) => serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Invalid template manifest: {e}"))),
    }
}

/// Chooses the templates root: an explicit path wins over the bundled templates.
pub fn resolve_templates_dir(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| PathBuf::from(BUNDLED_TEMPLATES_DIR))
}

/// Lowest-precedence values, used when neither the user nor the template set one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalDefaults {
    pub license: String,
    pub version: String,
    pub package_manager: PackageManager,
    pub description: String,
    pub author: String,
    pub email: String,
}

impl Default for GlobalDefaults {
    fn default() -> Self {
        Self {
            license: DEFAULT_LICENSE.to_string(),
            version: DEFAULT_VERSION.to_string(),
            package_manager: PackageManager::Npm,
            description: String::new(),
            author: String::new(),
            email: String::new(),
        }
    }
}

impl GlobalDefaults {
    /// Built-in defaults with author and email taken from the user's git config, if any.
    pub fn detect() -> Self {
        let mut defaults = Self::default();
        match git2::Config::open_default() {
            Ok(config) => {
                if let Ok(name) = config.get_string("user.name") {
                    defaults.author = name;
                }
                if let Ok(email) = config.get_string("user.email") {
                    defaults.email = email;
                }
            }
            Err(e) => debug!("No git config available: {e}"),
        }
        defaults
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest_yaml_fallback() {
        let yaml = "name: demo\nframework: nodejs\nbuildTool: tsup\nfiles:\n  - src/index.ts\n";
        let manifest = parse_manifest(yaml).unwrap();
        assert_eq!(manifest.name, "demo");
        assert_eq!(manifest.version, DEFAULT_VERSION);
        assert_eq!(manifest.files.len(), 1);
    }

    #[test]
    fn test_parse_manifest_rejects_unknown_feature() {
        let json = r#"{"name": "demo", "framework": "react", "buildTool": "vite",
            "features": ["typescript", "blockchain"], "files": []}"#;
        assert!(matches!(parse_manifest(json), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_resolve_templates_dir() {
        assert_eq!(resolve_templates_dir(Some(PathBuf::from("/tmp/t"))), PathBuf::from("/tmp/t"));
        assert_eq!(resolve_templates_dir(None), PathBuf::from(BUNDLED_TEMPLATES_DIR));
    }
}
