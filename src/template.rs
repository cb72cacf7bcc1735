//! Template data model.
//! A template is an immutable bundle of metadata plus an ordered file manifest,
//! loaded from a directory holding `template.{json,yml,yaml}` and a `files/` tree.

use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::{load_manifest, parse_manifest};
use crate::constants::{DEFAULT_VERSION, LITERAL_PATTERNS, MANIFEST_FILES, TEMPLATE_FILES_DIR};
use crate::error::{Error, Result};
use crate::package::PackageManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    Vue2,
    Vue3,
    React,
    Typescript,
    Nodejs,
    Library,
}

impl Framework {
    pub fn as_str(&self) -> &'static str {
        match self {
            Framework::Vue2 => "vue2",
            Framework::Vue3 => "vue3",
            Framework::React => "react",
            Framework::Typescript => "typescript",
            Framework::Nodejs => "nodejs",
            Framework::Library => "library",
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildTool {
    Vite,
    Rollup,
    Tsup,
    Webpack,
}

impl BuildTool {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildTool::Vite => "vite",
            BuildTool::Rollup => "rollup",
            BuildTool::Tsup => "tsup",
            BuildTool::Webpack => "webpack",
        }
    }
}

impl fmt::Display for BuildTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Optional tooling a template can switch on.
///
/// Every feature is exposed to templates as a boolean of the same name, so the
/// set is closed: a manifest naming anything else fails to load.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Typescript,
    Eslint,
    Prettier,
    Husky,
    Commitlint,
    Stylelint,
    Router,
    Pinia,
    Vuex,
    Sass,
    Tailwind,
    Vitest,
    Jest,
}

impl Feature {
    pub const ALL: [Feature; 13] = [
        Feature::Typescript,
        Feature::Eslint,
        Feature::Prettier,
        Feature::Husky,
        Feature::Commitlint,
        Feature::Stylelint,
        Feature::Router,
        Feature::Pinia,
        Feature::Vuex,
        Feature::Sass,
        Feature::Tailwind,
        Feature::Vitest,
        Feature::Jest,
    ];

    /// Context key holding this feature's flag.
    pub fn key(&self) -> &'static str {
        match self {
            Feature::Typescript => "typescript",
            Feature::Eslint => "eslint",
            Feature::Prettier => "prettier",
            Feature::Husky => "husky",
            Feature::Commitlint => "commitlint",
            Feature::Stylelint => "stylelint",
            Feature::Router => "router",
            Feature::Pinia => "pinia",
            Feature::Vuex => "vuex",
            Feature::Sass => "sass",
            Feature::Tailwind => "tailwind",
            Feature::Vitest => "vitest",
            Feature::Jest => "jest",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.key())
    }
}

/// Values a template supplies when the user leaves them out.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TemplateDefaults {
    pub description: Option<String>,
    pub author: Option<String>,
    pub email: Option<String>,
    pub license: Option<String>,
    pub version: Option<String>,
    pub package_manager: Option<PackageManager>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    /// Copied byte for byte.
    Literal(Vec<u8>),
    /// Rendered against the substitution context.
    Templated(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    /// Relative to both the template's `files/` directory and the target directory.
    pub path: PathBuf,
    pub content: FileContent,
}

impl TemplateFile {
    pub fn literal<P: Into<PathBuf>>(path: P, bytes: impl Into<Vec<u8>>) -> Self {
        Self { path: path.into(), content: FileContent::Literal(bytes.into()) }
    }

    pub fn templated<P: Into<PathBuf>>(path: P, text: impl Into<String>) -> Self {
        Self { path: path.into(), content: FileContent::Templated(text.into()) }
    }

    pub fn is_templated(&self) -> bool {
        matches!(self.content, FileContent::Templated(_))
    }
}

/// One project archetype.
#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub version: String,
    pub author: String,
    pub framework: Framework,
    pub build_tool: BuildTool,
    pub features: Vec<Feature>,
    pub defaults: TemplateDefaults,
    pub files: Vec<TemplateFile>,
    pub dependencies: IndexMap<String, String>,
    pub dev_dependencies: IndexMap<String, String>,
    pub scripts: IndexMap<String, String>,
}

impl Template {
    /// Creates an empty template; mostly useful for building templates in code.
    pub fn new<S: Into<String>>(name: S, framework: Framework, build_tool: BuildTool) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            description: String::new(),
            version: DEFAULT_VERSION.to_string(),
            author: String::new(),
            framework,
            build_tool,
            features: Vec::new(),
            defaults: TemplateDefaults::default(),
            files: Vec::new(),
            dependencies: IndexMap::new(),
            dev_dependencies: IndexMap::new(),
            scripts: IndexMap::new(),
        }
    }

    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    /// Whether the manifest already ships a file at `path`.
    pub fn emits<P: AsRef<Path>>(&self, path: P) -> bool {
        self.files.iter().any(|file| file.path == path.as_ref())
    }

    /// Loads a template from `template_dir`, reading every listed file into memory.
    ///
    /// # Errors
    /// * `Error::ConfigError` if the manifest is missing or invalid, or a templated
    ///   file is not UTF-8
    /// * `Error::PathTraversalError` if a listed path is absolute or contains `..`
    /// * `Error::MissingTemplateFileError` if a listed file does not exist
    pub fn load<P: AsRef<Path>>(template_dir: P) -> Result<Self> {
        let template_dir = template_dir.as_ref();
        let manifest = parse_manifest(&load_manifest(template_dir, &MANIFEST_FILES)?)?;
        let literal = build_literal_set(&manifest.literal)?;
        let files_root = template_dir.join(TEMPLATE_FILES_DIR);

        let mut files = Vec::with_capacity(manifest.files.len());
        for entry in &manifest.files {
            let (path, templated) = entry.parts();
            if !is_contained(path) {
                return Err(Error::PathTraversalError { path: path.to_path_buf() });
            }

            let source = files_root.join(path);
            if !source.is_file() {
                return Err(Error::MissingTemplateFileError {
                    template: manifest.name.clone(),
                    path: path.to_path_buf(),
                });
            }

            let bytes = fs::read(&source)?;
            let templated = templated.unwrap_or_else(|| !literal.is_match(path));
            let content = if templated {
                FileContent::Templated(String::from_utf8(bytes).map_err(|_| {
                    Error::ConfigError(format!(
                        "'{}' in template '{}' is not valid UTF-8; mark it as literal",
                        path.display(),
                        manifest.name
                    ))
                })?)
            } else {
                FileContent::Literal(bytes)
            };
            debug!("Loaded {} ({})", source.display(), if templated { "templated" } else { "literal" });
            files.push(TemplateFile { path: normalize_path(path), content });
        }

        Ok(Self {
            display_name: manifest.display_name.unwrap_or_else(|| manifest.name.clone()),
            name: manifest.name,
            description: manifest.description,
            version: manifest.version,
            author: manifest.author,
            framework: manifest.framework,
            build_tool: manifest.build_tool,
            features: manifest.features,
            defaults: manifest.defaults,
            files,
            dependencies: manifest.dependencies,
            dev_dependencies: manifest.dev_dependencies,
            scripts: manifest.scripts,
        })
    }
}

/// On-disk shape of `template.{json,yml,yaml}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TemplateManifest {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub author: String,
    pub framework: Framework,
    pub build_tool: BuildTool,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default)]
    pub defaults: TemplateDefaults,
    /// Extra glob patterns for files copied without rendering.
    #[serde(default)]
    pub literal: Vec<String>,
    pub files: Vec<FileEntry>,
    #[serde(default)]
    pub dependencies: IndexMap<String, String>,
    #[serde(default)]
    pub dev_dependencies: IndexMap<String, String>,
    #[serde(default)]
    pub scripts: IndexMap<String, String>,
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

/// A manifest file entry: either a bare path or a path with an explicit marker.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum FileEntry {
    Path(PathBuf),
    Detailed {
        path: PathBuf,
        #[serde(default)]
        templated: Option<bool>,
    },
}

impl FileEntry {
    fn parts(&self) -> (&Path, Option<bool>) {
        match self {
            FileEntry::Path(path) => (path, None),
            FileEntry::Detailed { path, templated } => (path, *templated),
        }
    }
}

fn build_literal_set(extra: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in LITERAL_PATTERNS.iter().copied().chain(extra.iter().map(String::as_str)) {
        builder.add(Glob::new(pattern).map_err(|e| {
            Error::ConfigError(format!("invalid literal pattern '{pattern}': {e}"))
        })?);
    }
    builder
        .build()
        .map_err(|e| Error::ConfigError(format!("literal patterns failed to compile: {e}")))
}

/// Drops `.` components so `./package.json` and `package.json` name the same entry.
pub fn normalize_path<P: AsRef<Path>>(path: P) -> PathBuf {
    path.as_ref()
        .components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}

/// Returns true when `path` is a non-empty relative path that stays below its root.
pub fn is_contained<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    let mut depth = 0usize;
    for component in path.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    depth > 0
}
