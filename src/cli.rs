//! Command-line interface implementation for Seedling.
//! Provides argument parsing, interactive input collection and the text
//! output of the `list`, `show` and `create` commands.

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};

use crate::constants::TEMPLATES_DIR_ENV;
use crate::error::{Error, Result};
use crate::generator::GenerationResult;
use crate::package::PackageManager;
use crate::prompt::Prompter;
use crate::registry::TemplateRegistry;
use crate::resolver::UserInput;
use crate::template::{Feature, FileContent, Template};

/// Command-line arguments structure for Seedling.
#[derive(Parser, Debug)]
#[command(author, version, about = "Seedling: generate starter projects from templates", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding the template catalog
    #[arg(long, global = true, env = TEMPLATES_DIR_ENV, value_name = "DIR")]
    pub templates_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List available templates
    List,
    /// Show one template's metadata and files
    Show {
        #[arg(value_name = "TEMPLATE")]
        name: String,
    },
    /// Create a new project from a template
    Create(CreateArgs),
}

#[derive(clap::Args, Debug)]
pub struct CreateArgs {
    /// Directory where the generated project will be created
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Template to use (asked interactively when omitted)
    #[arg(short, long)]
    pub template: Option<String>,

    /// Project name (defaults to the output directory name)
    #[arg(short, long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub author: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub license: Option<String>,

    /// Initial package version
    #[arg(long, value_name = "VERSION")]
    pub pkg_version: Option<String>,

    #[arg(long, value_enum)]
    pub package_manager: Option<PackageManager>,

    /// Features to switch on, comma separated
    #[arg(long, value_enum, value_delimiter = ',')]
    pub enable: Vec<Feature>,

    /// Features to switch off, comma separated
    #[arg(long, value_enum, value_delimiter = ',')]
    pub disable: Vec<Feature>,

    /// Write into the output directory even if it is not empty
    #[arg(short, long)]
    pub force: bool,

    /// Do not install dependencies after generation
    #[arg(long)]
    pub skip_install: bool,

    /// Do not initialize a git repository after generation
    #[arg(long)]
    pub skip_git: bool,

    /// Read answers as a JSON object from stdin
    #[arg(short, long)]
    pub stdin: bool,

    /// Never prompt; use defaults for anything not given
    #[arg(short, long)]
    pub yes: bool,

    /// Print the generation result as JSON
    #[arg(long)]
    pub json: bool,
}

impl CreateArgs {
    /// User input carried by flags alone.
    pub fn user_input(&self) -> UserInput {
        let mut input = UserInput {
            project_name: self.name.clone().unwrap_or_default(),
            description: self.description.clone(),
            author: self.author.clone(),
            email: self.email.clone(),
            license: self.license.clone(),
            version: self.pkg_version.clone(),
            package_manager: self.package_manager,
            ..UserInput::default()
        };
        for feature in &self.enable {
            input.features.insert(*feature, true);
        }
        for feature in &self.disable {
            input.features.insert(*feature, false);
        }
        input
    }

    pub fn interactive(&self) -> bool {
        !self.yes && !self.stdin
    }
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument
                || e.kind() == ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            {
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}

/// Reads a JSON answers object, as piped to `create --stdin`.
pub fn load_answers<R: Read>(reader: R) -> Result<UserInput> {
    Ok(serde_json::from_reader(reader)?)
}

/// Fallback project name: the last component of the output directory.
pub fn default_project_name<P: AsRef<Path>>(output_dir: P) -> String {
    output_dir
        .as_ref()
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Works out the template name, asking when interactive.
pub fn choose_template(
    prompt: &dyn Prompter,
    registry: &TemplateRegistry,
    args: &CreateArgs,
) -> Result<String> {
    if let Some(template) = &args.template {
        return Ok(template.clone());
    }
    if !args.interactive() {
        return Err(Error::ConfigError("no template given (use --template)".to_string()));
    }
    let names: Vec<String> = registry.names().map(str::to_string).collect();
    if names.is_empty() {
        return Err(Error::ConfigError("no templates available".to_string()));
    }
    let labels: Vec<String> = registry
        .list_templates()
        .map(|t| format!("{} - {}", t.name, t.description))
        .collect();
    let index = prompt.select("Template", &labels, 0)?;
    Ok(names[index].clone())
}

/// Merges stdin answers, flags and (when interactive) a prompted project name.
pub fn collect_input(
    prompt: &dyn Prompter,
    args: &CreateArgs,
    answers: Option<UserInput>,
) -> Result<UserInput> {
    let mut input = answers.unwrap_or_default().overlay(args.user_input());
    if input.project_name.trim().is_empty() {
        let fallback = default_project_name(&args.output_dir);
        input.project_name = if args.interactive() {
            prompt.input("Project name", &fallback)?
        } else {
            fallback
        };
    }
    Ok(input)
}

/// Whether to write into a non-empty target: `--force`, or a confirmed prompt.
pub fn confirm_overwrite(prompt: &dyn Prompter, args: &CreateArgs) -> Result<bool> {
    if args.force {
        return Ok(true);
    }
    let occupied = std::fs::read_dir(&args.output_dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false);
    if !occupied || !args.interactive() {
        return Ok(false);
    }
    prompt.confirm(
        false,
        format!("Directory '{}' is not empty. Write into it anyway?", args.output_dir.display()),
    )
}

pub fn format_template_list(registry: &TemplateRegistry) -> String {
    let width = registry.names().map(str::len).max().unwrap_or(0);
    to_block(registry.list_templates().map(|template| {
        format!(
            "{:width$}  {:<10} {:<8} {}",
            template.name, template.framework, template.build_tool, template.description,
        )
    }))
}

pub fn format_template_details(template: &Template) -> String {
    let mut lines = vec![format!(
        "{} ({}) v{}",
        template.display_name, template.name, template.version
    )];
    if !template.description.is_empty() {
        lines.push(template.description.clone());
    }
    lines.push(format!("framework:  {}", template.framework));
    lines.push(format!("build tool: {}", template.build_tool));
    if !template.author.is_empty() {
        lines.push(format!("author:     {}", template.author));
    }
    let features: Vec<&str> = template.features.iter().map(Feature::key).collect();
    let features = if features.is_empty() { "-".to_string() } else { features.join(", ") };
    lines.push(format!("features:   {features}"));
    lines.push("files:".to_string());
    for file in &template.files {
        let marker = match file.content {
            FileContent::Templated(_) => "",
            FileContent::Literal(_) => " (literal)",
        };
        lines.push(format!("  {}{marker}", file.path.display()));
    }
    for (title, entries) in [
        ("dependencies", &template.dependencies),
        ("devDependencies", &template.dev_dependencies),
        ("scripts", &template.scripts),
    ] {
        if entries.is_empty() {
            continue;
        }
        lines.push(format!("{title}:"));
        lines.extend(entries.iter().map(|(key, value)| format!("  {key}: {value}")));
    }
    to_block(lines)
}

/// Human-readable report of a generation run.
pub fn format_result(result: &GenerationResult) -> String {
    let mut lines: Vec<String> = result
        .files
        .iter()
        .map(|file| format!("Created: '{}'", result.project_path.join(file).display()))
        .collect();
    lines.extend(result.warnings.iter().map(|warning| format!("Warning: {warning}")));
    lines.push(match &result.error {
        None => format!(
            "Project generated successfully in {} ({} ms).",
            result.project_path.display(),
            result.duration.as_millis()
        ),
        Some(failure) => format!("Error: {}", failure.message),
    });
    to_block(lines)
}

/// Joins lines, terminating each with a newline.
fn to_block<I: IntoIterator<Item = String>>(lines: I) -> String {
    lines.into_iter().map(|line| line + "\n").collect()
}
