//! Project materialization: writes a template's files into the target
//! directory in manifest order and finishes with `package.json`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::debug;

use crate::constants::PACKAGE_JSON;
use crate::error::{Error, Result};
use crate::package::{fresh_package_json, merge_package_json, ManifestSections};
use crate::renderer::TemplateRenderer;
use crate::resolver::{validate, SubstitutionContext};
use crate::template::{is_contained, FileContent, Template, TemplateFile};

/// Cooperative cancellation shared between a caller and a running generation.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What to do with one manifest entry.
#[derive(Debug, PartialEq, Eq)]
pub enum FileOperation<'a> {
    /// Literal content, written unchanged.
    Copy { target: PathBuf, content: &'a [u8] },
    /// Rendered content.
    Write { target: PathBuf, content: String },
}

impl FileOperation<'_> {
    pub fn target(&self) -> &Path {
        match self {
            FileOperation::Copy { target, .. } | FileOperation::Write { target, .. } => target,
        }
    }

    pub fn content(&self) -> &[u8] {
        match self {
            FileOperation::Copy { content, .. } => content,
            FileOperation::Write { content, .. } => content.as_bytes(),
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            FileOperation::Copy { .. } => "Copied",
            FileOperation::Write { .. } => "Rendered",
        }
    }
}

/// Ensures the output directory is safe to write to.
///
/// # Arguments
/// * `output_dir` - Target directory path for generated output
/// * `overwrite` - Whether to write into a directory that already has content
///
/// # Errors
/// * `Error::TargetNotEmptyError` listing the existing entries when the
///   directory is not empty and `overwrite` is false
pub fn ensure_output_dir<P: AsRef<Path>>(output_dir: P, overwrite: bool) -> Result<()> {
    let output_dir = output_dir.as_ref();
    if !output_dir.exists() || overwrite {
        return Ok(());
    }
    if !output_dir.is_dir() {
        return Err(Error::TargetNotEmptyError {
            target: output_dir.to_path_buf(),
            conflicts: vec![output_dir.to_path_buf()],
        });
    }

    let mut conflicts = fs::read_dir(output_dir)?
        .map(|entry| entry.map(|entry| PathBuf::from(entry.file_name())))
        .collect::<std::io::Result<Vec<_>>>()?;
    if conflicts.is_empty() {
        return Ok(());
    }
    conflicts.sort();
    Err(Error::TargetNotEmptyError { target: output_dir.to_path_buf(), conflicts })
}

/// Joins a manifest path onto the target directory, refusing anything that
/// would land outside it.
pub fn resolve_target_path<P: AsRef<Path>, Q: AsRef<Path>>(output_dir: P, relative: Q) -> Result<PathBuf> {
    let relative = relative.as_ref();
    if !is_contained(relative) {
        return Err(Error::PathTraversalError { path: relative.to_path_buf() });
    }
    Ok(output_dir.as_ref().join(relative))
}

/// Fails unless `target` lands below the canonical `root` once existing
/// symlinks on its path are followed. A symlink at `target` itself is refused.
fn ensure_on_disk_containment(root: &Path, relative: &Path, target: &Path) -> Result<()> {
    let escape = || Error::PathTraversalError { path: relative.to_path_buf() };
    if fs::symlink_metadata(target).is_ok_and(|meta| meta.file_type().is_symlink()) {
        return Err(escape());
    }
    let mut ancestor = target.parent();
    while let Some(dir) = ancestor {
        if fs::symlink_metadata(dir).is_ok() {
            break;
        }
        ancestor = dir.parent();
    }
    let resolved = match ancestor {
        Some(dir) => fs::canonicalize(dir).map_err(|_| escape())?,
        None => return Err(escape()),
    };
    if !resolved.starts_with(root) {
        return Err(escape());
    }
    Ok(())
}

fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    let write_error = |source| Error::WriteError { path: path.to_path_buf(), source };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    fs::write(path, content).map_err(write_error)
}

/// Renders one template into one output directory.
pub struct Processor<'a> {
    renderer: &'a dyn TemplateRenderer,
    template: &'a Template,
    context: &'a SubstitutionContext,
    context_value: serde_json::Value,
    output_root: &'a Path,
    cancel: Option<&'a CancelFlag>,
}

impl<'a> Processor<'a> {
    pub fn new(
        renderer: &'a dyn TemplateRenderer,
        template: &'a Template,
        context: &'a SubstitutionContext,
        output_root: &'a Path,
    ) -> Self {
        Self {
            renderer,
            template,
            context,
            context_value: context.to_value(),
            output_root,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, cancel: Option<&'a CancelFlag>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Runs every content check that must pass before anything is written.
    ///
    /// # Errors
    /// * `Error::PathTraversalError` if a manifest path escapes the output root,
    ///   textually or through a symlink already present under it
    /// * `Error::MissingPlaceholdersError` if the context lacks referenced keys
    /// * `Error::RenderError` if a templated file does not parse
    /// * `Error::JsonError` if the emitted `package.json` does not render to valid JSON
    pub fn check(&self) -> Result<()> {
        for file in &self.template.files {
            resolve_target_path(self.output_root, &file.path)?;
        }
        let missing = validate(self.context, self.template, self.renderer)?;
        if !missing.is_empty() {
            return Err(Error::MissingPlaceholdersError {
                template: self.template.name.clone(),
                keys: missing,
            });
        }
        if self.output_root.exists() {
            let root = self.canonical_root()?;
            for file in &self.template.files {
                let target = resolve_target_path(self.output_root, &file.path)?;
                ensure_on_disk_containment(&root, &file.path, &target)?;
            }
            let manifest = Path::new(PACKAGE_JSON);
            ensure_on_disk_containment(&root, manifest, &self.output_root.join(manifest))?;
        }
        self.package_json()?;
        Ok(())
    }

    /// Decides how a manifest entry is written, rendering it if needed.
    pub fn process(&self, file: &'a TemplateFile) -> Result<FileOperation<'a>> {
        let target = resolve_target_path(self.output_root, &file.path)?;
        match &file.content {
            FileContent::Literal(bytes) => Ok(FileOperation::Copy { target, content: bytes }),
            FileContent::Templated(text) => {
                let name = file.path.display().to_string();
                let placeholders = self.renderer.placeholders(&name, text)?;
                if let Some(key) = placeholders.into_iter().find(|key| !self.context.contains_key(key)) {
                    return Err(Error::UnresolvedPlaceholderError { key, file: file.path.clone() });
                }
                let content = self.renderer.render(&name, text, &self.context_value)?;
                Ok(FileOperation::Write { target, content })
            }
        }
    }

    /// Final `package.json` content: the emitted file with the manifest
    /// sections merged in, or a fresh manifest when the template ships none.
    pub fn package_json(&self) -> Result<String> {
        let sections = ManifestSections::render(self.template, &self.context_value, self.renderer)?;
        let Some(file) = self.template.files.iter().find(|file| file.path == Path::new(PACKAGE_JSON))
        else {
            return fresh_package_json(self.context, &sections);
        };

        let operation = self.process(file)?;
        let emitted = std::str::from_utf8(operation.content()).map_err(|_| {
            Error::ConfigError(format!("'{PACKAGE_JSON}' in template '{}' is not UTF-8", self.template.name))
        })?;
        if sections.is_empty() {
            return Ok(emitted.to_string());
        }
        merge_package_json(emitted, &sections)
    }

    /// Writes every manifest entry in order, then `package.json` if the
    /// template does not ship one.
    ///
    /// Relative paths are appended to `written` as each write succeeds, so the
    /// caller still knows what exists on disk when this returns an error.
    /// Nothing is rolled back.
    pub fn materialize(&self, written: &mut Vec<PathBuf>) -> Result<()> {
        let manifest = self.package_json()?;
        fs::create_dir_all(self.output_root).map_err(|source| Error::WriteError {
            path: self.output_root.to_path_buf(),
            source,
        })?;
        let root = self.canonical_root()?;

        for file in &self.template.files {
            if self.cancel.is_some_and(CancelFlag::is_cancelled) {
                return Err(Error::CancelledError);
            }
            let operation = self.process(file)?;
            ensure_on_disk_containment(&root, &file.path, operation.target())?;
            let content = if file.path == Path::new(PACKAGE_JSON) {
                manifest.as_bytes()
            } else {
                operation.content()
            };
            write_file(operation.target(), content)?;
            debug!("{}: '{}'", operation.action(), operation.target().display());
            written.push(file.path.clone());
        }

        if !self.template.emits(PACKAGE_JSON) {
            let relative = PathBuf::from(PACKAGE_JSON);
            let target = self.output_root.join(&relative);
            ensure_on_disk_containment(&root, &relative, &target)?;
            write_file(&target, manifest.as_bytes())?;
            debug!("Created '{}'", target.display());
            written.push(relative);
        }
        Ok(())
    }

    fn canonical_root(&self) -> Result<PathBuf> {
        fs::canonicalize(self.output_root).map_err(|source| Error::WriteError {
            path: self.output_root.to_path_buf(),
            source,
        })
    }
}
