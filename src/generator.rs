//! The single entry point shared by the CLI and any other front end:
//! look up a template, resolve the context, materialize, run hooks, report.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::{info, warn};
use serde::{Serialize, Serializer};

use crate::config::GlobalDefaults;
use crate::error::{Error, ErrorCode, Result};
use crate::hooks::{GitInitHook, InstallHook, PostGenerateHook};
use crate::processor::{ensure_output_dir, CancelFlag, Processor};
use crate::registry::TemplateRegistry;
use crate::renderer::{MiniJinjaRenderer, TemplateRenderer};
use crate::resolver::{resolve, UserInput};

#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Write into a target directory that already has content.
    pub overwrite: bool,
    pub skip_install: bool,
    pub skip_git: bool,
    pub cancel: Option<CancelFlag>,
}

/// Serializable view of the error that ended a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationFailure {
    pub code: ErrorCode,
    pub message: String,
    pub details: Vec<String>,
}

impl From<&Error> for GenerationFailure {
    fn from(err: &Error) -> Self {
        Self { code: err.code(), message: err.to_string(), details: err.details() }
    }
}

/// Outcome of one `generate` call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub success: bool,
    pub project_path: PathBuf,
    /// Relative paths written, in write order. On failure, what is left on disk.
    pub files: Vec<PathBuf>,
    pub error: Option<GenerationFailure>,
    /// One entry per failed post-generation hook.
    pub warnings: Vec<String>,
    #[serde(rename = "durationMs", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

/// Generates projects from the templates of one registry.
///
/// Holds no per-run state, so one generator can serve concurrent requests.
pub struct Generator<'a> {
    registry: &'a TemplateRegistry,
    renderer: Box<dyn TemplateRenderer>,
    globals: GlobalDefaults,
    hooks: Vec<Box<dyn PostGenerateHook>>,
}

impl<'a> Generator<'a> {
    pub fn new(registry: &'a TemplateRegistry) -> Self {
        Self {
            registry,
            renderer: Box::new(MiniJinjaRenderer::new()),
            globals: GlobalDefaults::default(),
            hooks: Vec::new(),
        }
    }

    pub fn with_globals(mut self, globals: GlobalDefaults) -> Self {
        self.globals = globals;
        self
    }

    pub fn with_renderer(mut self, renderer: Box<dyn TemplateRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Appends a hook that runs after the built-in install and git steps.
    pub fn with_hook(mut self, hook: Box<dyn PostGenerateHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Generates `template_name` into `target_dir`.
    ///
    /// Lookup, name and placeholder errors, and a non-empty target, are all
    /// reported before anything is written. A failed write stops the run and
    /// leaves earlier files in place; `files` lists them. Hook failures only
    /// add warnings.
    pub fn generate<P: AsRef<Path>>(
        &self,
        template_name: &str,
        target_dir: P,
        input: &UserInput,
        options: &GenerateOptions,
    ) -> GenerationResult {
        let started = Instant::now();
        let target_dir = target_dir.as_ref();
        let mut files = Vec::new();
        let mut warnings = Vec::new();

        let outcome = self.run(template_name, target_dir, input, options, &mut files, &mut warnings);
        let error = match outcome {
            Ok(()) => None,
            Err(err) => {
                if !files.is_empty() {
                    warn!(
                        "Generation stopped after writing {} file(s); leaving them in '{}'",
                        files.len(),
                        target_dir.display()
                    );
                }
                Some(GenerationFailure::from(&err))
            }
        };

        GenerationResult {
            success: error.is_none(),
            project_path: target_dir.to_path_buf(),
            files,
            error,
            warnings,
            duration: started.elapsed(),
        }
    }

    fn run(
        &self,
        template_name: &str,
        target_dir: &Path,
        input: &UserInput,
        options: &GenerateOptions,
        files: &mut Vec<PathBuf>,
        warnings: &mut Vec<String>,
    ) -> Result<()> {
        let template = self.registry.get_template(template_name)?;
        let context = resolve(template, input, &self.globals)?;
        let processor = Processor::new(&*self.renderer, template, &context, target_dir)
            .with_cancel(options.cancel.as_ref());

        processor.check()?;
        ensure_output_dir(target_dir, options.overwrite)?;
        processor.materialize(files)?;
        info!(
            "Generated '{}' from template '{}' ({} files)",
            target_dir.display(),
            template.name,
            files.len()
        );

        let mut builtin: Vec<Box<dyn PostGenerateHook>> = Vec::new();
        if !options.skip_install {
            builtin.push(Box::new(InstallHook::new()));
        }
        if !options.skip_git {
            builtin.push(Box::new(GitInitHook::new()));
        }
        for hook in builtin.iter().chain(self.hooks.iter()) {
            if let Err(e) = hook.run(target_dir, &context) {
                warn!("Post-generation step '{}' failed: {e}", hook.name());
                warnings.push(format!("{}: {e}", hook.name()));
            }
        }
        Ok(())
    }
}
