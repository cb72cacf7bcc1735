//! Variable resolution: turns partial user input into a complete substitution
//! context and statically checks templates against it.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use cruet::Inflector;
use indexmap::IndexMap;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::GlobalDefaults;
use crate::constants::MAX_PACKAGE_NAME_LEN;
use crate::error::{Error, Result};
use crate::package::PackageManager;
use crate::renderer::TemplateRenderer;
use crate::template::{Feature, FileContent, Template};

static PACKAGE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9._-]*$").expect("package name pattern"));

static HYPHEN_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-{2,}").expect("hyphen run pattern"));

/// Project metadata supplied by the caller. Everything but the name is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserInput {
    #[serde(default)]
    pub project_name: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub email: Option<String>,
    pub license: Option<String>,
    pub version: Option<String>,
    pub package_manager: Option<PackageManager>,
    /// Per-feature overrides of the template's defaults.
    #[serde(default)]
    pub features: IndexMap<Feature, bool>,
}

impl UserInput {
    pub fn new<S: Into<String>>(project_name: S) -> Self {
        Self { project_name: project_name.into(), ..Self::default() }
    }

    pub fn with_feature(mut self, feature: Feature, enabled: bool) -> Self {
        self.features.insert(feature, enabled);
        self
    }

    /// Layers `other` on top of `self`: whatever `other` sets wins.
    pub fn overlay(mut self, other: UserInput) -> Self {
        if !other.project_name.is_empty() {
            self.project_name = other.project_name;
        }
        self.description = other.description.or(self.description);
        self.author = other.author.or(self.author);
        self.email = other.email.or(self.email);
        self.license = other.license.or(self.license);
        self.version = other.version.or(self.version);
        self.package_manager = other.package_manager.or(self.package_manager);
        self.features.extend(other.features);
        self
    }
}

/// The resolved key-value set placeholders are rendered from.
///
/// Built only by [`resolve`]; there is no way to change it afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct SubstitutionContext {
    values: Map<String, Value>,
}

impl SubstitutionContext {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(Value::as_bool)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn package_manager(&self) -> PackageManager {
        self.get_str("packageManager").and_then(|pm| pm.parse().ok()).unwrap_or_default()
    }

    /// The context as a JSON object, ready to hand to a renderer.
    pub fn to_value(&self) -> Value {
        Value::Object(self.values.clone())
    }
}

/// Derives an npm-safe package name from a free-form project name.
///
/// Lowercases, replaces anything outside `[a-z0-9._-]` with `-`, collapses
/// runs of `-` and trims separators from both ends.
///
/// # Errors
/// * `Error::InvalidProjectNameError` if nothing valid remains or the name is too long
pub fn derive_package_name(project_name: &str) -> Result<String> {
    let replaced: String = project_name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '.' | '_' | '-' => c,
            _ => '-',
        })
        .collect();
    let collapsed = HYPHEN_RUNS.replace_all(&replaced, "-");
    let package_name = collapsed.trim_matches(|c| matches!(c, '-' | '.' | '_')).to_string();

    let invalid = |reason: String| Error::InvalidProjectNameError {
        name: project_name.to_string(),
        reason,
    };
    if package_name.len() > MAX_PACKAGE_NAME_LEN {
        return Err(invalid(format!(
            "package name is {} characters long (max {MAX_PACKAGE_NAME_LEN})",
            package_name.len()
        )));
    }
    if !PACKAGE_NAME.is_match(&package_name) {
        return Err(invalid("no valid package name characters remain".to_string()));
    }
    Ok(package_name)
}

/// Builds the substitution context for `template`.
///
/// Precedence is user input, then template defaults, then `globals`. Feature
/// flags are user override, then the template's feature list, then `false`.
///
/// # Errors
/// * `Error::InvalidProjectNameError` if the project name is empty or not npm-safe
pub fn resolve(
    template: &Template,
    input: &UserInput,
    globals: &GlobalDefaults,
) -> Result<SubstitutionContext> {
    let project_name = input.project_name.trim();
    if project_name.is_empty() {
        return Err(Error::InvalidProjectNameError {
            name: String::new(),
            reason: "project name is empty".to_string(),
        });
    }
    let package_name = derive_package_name(project_name)?;

    let pick = |user: &Option<String>, from_template: &Option<String>, global: &str| {
        user.clone().or_else(|| from_template.clone()).unwrap_or_else(|| global.to_string())
    };
    let defaults = &template.defaults;
    let package_manager = input
        .package_manager
        .or(defaults.package_manager)
        .unwrap_or(globals.package_manager);

    let mut values = Map::new();
    let mut set = |key: &str, value: Value| {
        values.insert(key.to_string(), value);
    };
    set("templateName", template.name.clone().into());
    set("projectName", project_name.into());
    set("projectNamePascal", package_name.to_pascal_case().into());
    set("projectNameCamel", package_name.to_camel_case().into());
    set("packageName", package_name.into());
    set("description", pick(&input.description, &defaults.description, &globals.description).into());
    set("author", pick(&input.author, &defaults.author, &globals.author).into());
    set("email", pick(&input.email, &defaults.email, &globals.email).into());
    set("license", pick(&input.license, &defaults.license, &globals.license).into());
    set("version", pick(&input.version, &defaults.version, &globals.version).into());
    set("framework", template.framework.as_str().into());
    set("buildTool", template.build_tool.as_str().into());
    set("packageManager", package_manager.as_str().into());
    for feature in Feature::ALL {
        let enabled = input
            .features
            .get(&feature)
            .copied()
            .unwrap_or_else(|| template.has_feature(feature));
        set(feature.key(), enabled.into());
    }

    debug!("Resolved {} context keys for template '{}'", values.len(), template.name);
    Ok(SubstitutionContext { values })
}

/// Lists every placeholder `template` uses that `context` does not define.
///
/// Scans templated files, scripts and dependency ranges without rendering
/// anything. The result is sorted and free of duplicates.
///
/// # Errors
/// * `Error::RenderError` if a templated file does not parse
pub fn validate(
    context: &SubstitutionContext,
    template: &Template,
    renderer: &dyn TemplateRenderer,
) -> Result<Vec<String>> {
    let mut sources: Vec<(String, &str)> = template
        .files
        .iter()
        .filter_map(|file| match &file.content {
            FileContent::Templated(text) => Some((file.path.display().to_string(), text.as_str())),
            FileContent::Literal(_) => None,
        })
        .collect();
    for (section, entries) in [
        ("scripts", &template.scripts),
        ("dependencies", &template.dependencies),
        ("devDependencies", &template.dev_dependencies),
    ] {
        sources.extend(entries.iter().map(|(key, value)| (format!("{section}.{key}"), value.as_str())));
    }

    let mut missing = BTreeSet::new();
    for (name, source) in sources {
        for key in renderer.placeholders(&name, source)? {
            if !context.contains_key(&key) {
                debug!("'{name}' references undefined placeholder '{key}'");
                missing.insert(key);
            }
        }
    }
    Ok(missing.into_iter().collect())
}
