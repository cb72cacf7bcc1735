//! Placeholder rendering for templated files and manifest fields.
//! Backed by MiniJinja in strict mode: referencing a key the context does not
//! define is an error, never an empty string.
use std::collections::BTreeSet;

use minijinja::{AutoEscape, Environment, UndefinedBehavior};

use crate::constants::ENGINE_GLOBALS;
use crate::error::{Error, Result};

/// Trait for template rendering engines.
pub trait TemplateRenderer: Send + Sync {
    /// Renders a template string with the given context.
    ///
    /// # Arguments
    /// * `name` - Label used in error messages (usually the file path)
    /// * `template` - Template string to render
    /// * `context` - Context variables for rendering
    fn render(&self, name: &str, template: &str, context: &serde_json::Value) -> Result<String>;

    /// Returns every top-level variable the template reads, without rendering it.
    fn placeholders(&self, name: &str, template: &str) -> Result<BTreeSet<String>>;
}

/// MiniJinja-based template rendering engine.
pub struct MiniJinjaRenderer {
    /// MiniJinja environment instance
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    /// Creates a strict renderer that keeps trailing newlines intact.
    ///
    /// Auto-escaping is off: file names like `package.json` or `index.html`
    /// must not change how values are written.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_keep_trailing_newline(true);
        Self { env }
    }
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        MiniJinjaRenderer::new()
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    /// # Errors
    /// * `Error::RenderError` if the template fails to parse or references an undefined key
    fn render(&self, name: &str, template: &str, context: &serde_json::Value) -> Result<String> {
        self.env
            .render_named_str(name, template, context)
            .map_err(|source| Error::RenderError { file: name.to_string(), source })
    }

    fn placeholders(&self, name: &str, template: &str) -> Result<BTreeSet<String>> {
        // Parsing only; a scratch environment borrows the source for this call.
        let env = Environment::new();
        let tmpl = env
            .template_from_named_str(name, template)
            .map_err(|source| Error::RenderError { file: name.to_string(), source })?;
        Ok(tmpl
            .undeclared_variables(false)
            .into_iter()
            .filter(|var| !ENGINE_GLOBALS.contains(&var.as_str()))
            .collect())
    }
}
