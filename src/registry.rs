//! Read-only catalog of the templates available to a process.

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use indexmap::IndexMap;
use log::{debug, info};
use regex::Regex;
use walkdir::WalkDir;

use crate::constants::MANIFEST_FILES;
use crate::error::{Error, Result};
use crate::template::{is_contained, normalize_path, Template};

static TEMPLATE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("template name pattern"));

/// Templates in registration order, indexed by name.
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    templates: IndexMap<String, Template>,
}

impl TemplateRegistry {
    /// Registers `templates` in the order given, normalizing manifest paths.
    ///
    /// # Errors
    /// * `Error::DuplicateTemplateError` if two templates share a name
    /// * `Error::ConfigError` if a name is not kebab-case, or a template lists
    ///   the same path twice
    /// * `Error::PathTraversalError` if a manifest path escapes the template root
    pub fn new<I: IntoIterator<Item = Template>>(templates: I) -> Result<Self> {
        let mut registry = IndexMap::new();
        for mut template in templates {
            if !TEMPLATE_NAME.is_match(&template.name) {
                return Err(Error::ConfigError(format!(
                    "template name '{}' must be kebab-case",
                    template.name
                )));
            }
            if let Some(file) = template.files.iter().find(|file| !is_contained(&file.path)) {
                return Err(Error::PathTraversalError { path: file.path.clone() });
            }
            let mut seen = HashSet::new();
            for file in &mut template.files {
                file.path = normalize_path(&file.path);
                if !seen.insert(file.path.clone()) {
                    return Err(Error::ConfigError(format!(
                        "template '{}' lists '{}' more than once",
                        template.name,
                        file.path.display()
                    )));
                }
            }
            if registry.contains_key(&template.name) {
                return Err(Error::DuplicateTemplateError { name: template.name });
            }
            debug!("Registered template '{}' ({} files)", template.name, template.files.len());
            registry.insert(template.name.clone(), template);
        }
        Ok(Self { templates: registry })
    }

    /// Loads every template directory directly under `root`, sorted by directory name.
    ///
    /// Directories without a manifest are skipped.
    pub fn load<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(Error::ConfigError(format!(
                "templates directory '{}' does not exist",
                root.display()
            )));
        }

        let mut templates = Vec::new();
        for entry in WalkDir::new(root).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::ConfigError(e.to_string()))?;
            let dir = entry.path();
            if !entry.file_type().is_dir() {
                continue;
            }
            if !MANIFEST_FILES.iter().any(|file| dir.join(file).is_file()) {
                debug!("Skipping '{}': no template manifest", dir.display());
                continue;
            }
            templates.push(Template::load(dir)?);
        }

        let registry = Self::new(templates)?;
        info!("Loaded {} templates from {}", registry.len(), root.display());
        Ok(registry)
    }

    /// All templates in registration order.
    pub fn list_templates(&self) -> impl Iterator<Item = &Template> {
        self.templates.values()
    }

    /// Exact-match lookup by name.
    ///
    /// # Errors
    /// * `Error::TemplateNotFoundError` carrying `name` when nothing matches
    pub fn get_template(&self, name: &str) -> Result<&Template> {
        self.templates
            .get(name)
            .ok_or_else(|| Error::TemplateNotFoundError { name: name.to_string() })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
