//! `package.json` synthesis and merging, plus the package manager choice.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{Error, Result};
use crate::renderer::TemplateRenderer;
use crate::resolver::SubstitutionContext;
use crate::template::Template;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    #[default]
    Npm,
    Yarn,
    Pnpm,
}

impl PackageManager {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "yarn",
            PackageManager::Pnpm => "pnpm",
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for PackageManager {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "npm" => Ok(PackageManager::Npm),
            "yarn" => Ok(PackageManager::Yarn),
            "pnpm" => Ok(PackageManager::Pnpm),
            other => Err(Error::ConfigError(format!("unknown package manager '{other}'"))),
        }
    }
}

/// Template-declared manifest sections with placeholders already rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestSections {
    pub scripts: IndexMap<String, String>,
    pub dependencies: IndexMap<String, String>,
    pub dev_dependencies: IndexMap<String, String>,
}

impl ManifestSections {
    /// Renders every script and version range of `template` against `context`.
    pub fn render(
        template: &Template,
        context: &Value,
        renderer: &dyn TemplateRenderer,
    ) -> Result<Self> {
        let render_all = |section: &str, entries: &IndexMap<String, String>| {
            entries
                .iter()
                .map(|(key, value)| -> Result<(String, String)> {
                    let label = format!("{section}.{key}");
                    Ok((key.clone(), renderer.render(&label, value, context)?))
                })
                .collect::<Result<IndexMap<_, _>>>()
        };
        Ok(Self {
            scripts: render_all("scripts", &template.scripts)?,
            dependencies: render_all("dependencies", &template.dependencies)?,
            dev_dependencies: render_all("devDependencies", &template.dev_dependencies)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty() && self.dependencies.is_empty() && self.dev_dependencies.is_empty()
    }

    fn sections(&self) -> [(&'static str, &IndexMap<String, String>); 3] {
        [
            ("scripts", &self.scripts),
            ("dependencies", &self.dependencies),
            ("devDependencies", &self.dev_dependencies),
        ]
    }
}

/// Merges `sections` into an emitted `package.json`.
///
/// Template values win on key collisions; existing keys keep their position and
/// new keys are appended.
///
/// # Errors
/// * `Error::JsonError` if `existing` is not valid JSON
/// * `Error::ConfigError` if the document or one of the sections is not an object
pub fn merge_package_json(existing: &str, sections: &ManifestSections) -> Result<String> {
    let mut document: Value = serde_json::from_str(existing)?;
    let root = document
        .as_object_mut()
        .ok_or_else(|| Error::ConfigError("package.json must contain a JSON object".to_string()))?;

    for (section, entries) in sections.sections() {
        if entries.is_empty() {
            continue;
        }
        let target = root
            .entry(section)
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .ok_or_else(|| {
                Error::ConfigError(format!("package.json field '{section}' must be an object"))
            })?;
        for (key, value) in entries {
            target.insert(key.clone(), Value::String(value.clone()));
        }
    }

    to_manifest_string(&document)
}

/// Builds a new `package.json` for templates that do not ship one.
pub fn fresh_package_json(
    context: &SubstitutionContext,
    sections: &ManifestSections,
) -> Result<String> {
    let field = |key: &str| context.get_str(key).unwrap_or_default().to_string();

    let mut root = Map::new();
    root.insert("name".into(), json!(field("packageName")));
    root.insert("version".into(), json!(field("version")));
    root.insert("description".into(), json!(field("description")));
    let author = match (field("author"), field("email")) {
        (name, email) if name.is_empty() => email,
        (name, email) if email.is_empty() => name,
        (name, email) => format!("{name} <{email}>"),
    };
    if !author.is_empty() {
        root.insert("author".into(), json!(author));
    }
    root.insert("license".into(), json!(field("license")));
    root.insert("private".into(), json!(true));
    for (section, entries) in sections.sections() {
        if !entries.is_empty() {
            root.insert(section.into(), json!(entries));
        }
    }

    to_manifest_string(&Value::Object(root))
}

fn to_manifest_string(document: &Value) -> Result<String> {
    let mut out = serde_json::to_string_pretty(document)?;
    out.push('\n');
    Ok(out)
}
