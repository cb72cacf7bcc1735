//! Seedling generates starter projects (Vue 2/3, React, Node.js APIs,
//! component libraries) from a catalog of templates.
//!
//! The pipeline is linear: the [`registry`] resolves a template by name, the
//! [`resolver`] builds the substitution context from user input, and the
//! [`processor`] writes the rendered files. [`generator::Generator`] ties the
//! steps together and runs the optional post-generation [`hooks`].

/// Command-line interface module for the Seedling application
pub mod cli;

/// Template manifest loading and global defaults
/// Supports JSON and YAML formats (template.json, template.yml, template.yaml)
pub mod config;

pub mod constants;

/// Error types and handling for the Seedling application
pub mod error;

/// Single `generate` entry point and its result type
pub mod generator;

/// Post-generation hooks (dependency install, git init)
pub mod hooks;

pub mod logger;

/// `package.json` synthesis and merging
pub mod package;

/// Writes rendered templates into the target directory
pub mod processor;

/// User input and interaction handling
pub mod prompt;

/// Catalog of available templates
pub mod registry;

/// Placeholder rendering
pub mod renderer;

/// Substitution context resolution and placeholder validation
pub mod resolver;

/// Template data model and on-disk loading
pub mod template;
