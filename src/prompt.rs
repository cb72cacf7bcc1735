//! Interactive questions asked by the CLI when input is missing.

use dialoguer::{Confirm, FuzzySelect, Input};

use crate::error::Result;

/// Source of answers for the CLI. Swapped out in tests.
pub trait Prompter {
    /// Asks for free text, pre-filled with `default`.
    fn input(&self, prompt: &str, default: &str) -> Result<String>;

    /// Asks a yes/no question; returns `true` immediately when `skip` is set.
    fn confirm(&self, skip: bool, prompt: String) -> Result<bool>;

    /// Returns the index of the chosen item.
    fn select(&self, prompt: &str, items: &[String], default: usize) -> Result<usize>;
}

/// Terminal prompter backed by dialoguer.
#[derive(Debug, Default)]
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for DialoguerPrompter {
    fn input(&self, prompt: &str, default: &str) -> Result<String> {
        Ok(Input::<String>::new()
            .with_prompt(prompt)
            .default(default.to_string())
            .interact_text()?)
    }

    fn confirm(&self, skip: bool, prompt: String) -> Result<bool> {
        if skip {
            return Ok(true);
        }
        Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
    }

    fn select(&self, prompt: &str, items: &[String], default: usize) -> Result<usize> {
        Ok(FuzzySelect::new()
            .with_prompt(prompt)
            .items(items)
            .default(default)
            .interact()?)
    }
}
