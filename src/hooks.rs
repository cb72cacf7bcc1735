//! Post-generation hooks.
//! Optional steps run after a project has been materialized. Each hook fails
//! on its own; a failure is reported as a warning and never undoes generation.

use std::path::Path;
use std::process::{Command, Stdio};

use log::{debug, info};

use crate::error::{Error, Result};
use crate::resolver::SubstitutionContext;

/// One optional step run against a freshly generated project.
pub trait PostGenerateHook: Send + Sync {
    /// Short label used in logs and warnings.
    fn name(&self) -> &str;

    fn run(&self, project_dir: &Path, context: &SubstitutionContext) -> Result<()>;
}

/// Installs dependencies with the project's package manager.
#[derive(Debug, Default)]
pub struct InstallHook {
    program: Option<String>,
}

impl InstallHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `program install` instead of the context's package manager.
    pub fn with_program<S: Into<String>>(program: S) -> Self {
        Self { program: Some(program.into()) }
    }
}

impl PostGenerateHook for InstallHook {
    fn name(&self) -> &str {
        "install"
    }

    fn run(&self, project_dir: &Path, context: &SubstitutionContext) -> Result<()> {
        let program = self
            .program
            .clone()
            .unwrap_or_else(|| context.package_manager().to_string());
        info!("Running '{program} install' in {}", project_dir.display());

        let status = Command::new(&program)
            .arg("install")
            .current_dir(project_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| Error::HookError {
                hook: self.name().to_string(),
                message: format!("failed to start '{program}': {e}"),
            })?;

        if !status.success() {
            return Err(Error::HookError {
                hook: self.name().to_string(),
                message: format!("'{program} install' exited with {status}"),
            });
        }
        Ok(())
    }
}

/// Initializes a git repository and records every generated file in a first commit.
#[derive(Debug)]
pub struct GitInitHook {
    message: String,
}

impl GitInitHook {
    pub fn new() -> Self {
        Self { message: "Initial commit".to_string() }
    }

    pub fn with_message<S: Into<String>>(message: S) -> Self {
        Self { message: message.into() }
    }
}

impl Default for GitInitHook {
    fn default() -> Self {
        GitInitHook::new()
    }
}

impl PostGenerateHook for GitInitHook {
    fn name(&self) -> &str {
        "git"
    }

    fn run(&self, project_dir: &Path, context: &SubstitutionContext) -> Result<()> {
        let repo = git2::Repository::init(project_dir)?;
        debug!("Initialized git repository in {}", project_dir.display());

        let mut index = repo.index()?;
        index.add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)?;
        index.write()?;
        let tree = repo.find_tree(index.write_tree()?)?;

        // Without a configured identity, sign with the project's author.
        let signature = match repo.signature() {
            Ok(signature) => signature,
            Err(_) => {
                let name = context.get_str("author").filter(|s| !s.is_empty()).unwrap_or("seedling");
                let email = context
                    .get_str("email")
                    .filter(|s| !s.is_empty())
                    .unwrap_or("seedling@localhost");
                git2::Signature::now(name, email)?
            }
        };
        let commit = repo.commit(Some("HEAD"), &signature, &signature, &self.message, &tree, &[])?;
        info!("Created initial commit {commit}");
        Ok(())
    }
}
