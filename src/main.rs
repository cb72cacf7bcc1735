//! Seedling's application entry point.
//! Parses arguments, loads the template catalog and dispatches to the
//! `list`, `show` and `create` commands.

use seedling::{
    cli::{
        choose_template, collect_input, confirm_overwrite, format_result, format_template_details,
        format_template_list, get_args, load_answers, Args, Command, CreateArgs,
    },
    config::{resolve_templates_dir, GlobalDefaults},
    error::{default_error_handler, Error, Result},
    generator::{GenerateOptions, Generator},
    logger::init_logger,
    prompt::DialoguerPrompter,
    registry::TemplateRegistry,
};

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    match run(args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => default_error_handler(err),
    }
}

/// Returns `Ok(false)` when generation ran but did not succeed.
fn run(args: Args) -> Result<bool> {
    let registry = TemplateRegistry::load(resolve_templates_dir(args.templates_dir))?;

    match args.command {
        Command::List => {
            print!("{}", format_template_list(&registry));
            Ok(true)
        }
        Command::Show { name } => {
            print!("{}", format_template_details(registry.get_template(&name)?));
            Ok(true)
        }
        Command::Create(create) => create_project(&registry, &create),
    }
}

/// Collects input, generates the project and reports the result.
///
/// # Flow
/// 1. Picks the template (flag or interactive selection)
/// 2. Merges stdin answers, flags and the prompted project name
/// 3. Confirms writing into a non-empty directory
/// 4. Generates, runs install/git hooks and prints the result
fn create_project(registry: &TemplateRegistry, args: &CreateArgs) -> Result<bool> {
    let prompt = DialoguerPrompter::new();

    let template = choose_template(&prompt, registry, args)?;
    let answers = if args.stdin { Some(load_answers(std::io::stdin().lock())?) } else { None };
    let input = collect_input(&prompt, args, answers)?;

    let options = GenerateOptions {
        overwrite: confirm_overwrite(&prompt, args)?,
        skip_install: args.skip_install,
        skip_git: args.skip_git,
        cancel: None,
    };

    let generator = Generator::new(registry).with_globals(GlobalDefaults::detect());
    let result = generator.generate(&template, &args.output_dir, &input, &options);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result).map_err(Error::JsonError)?);
    } else if result.success {
        print!("{}", format_result(&result));
    } else {
        eprint!("{}", format_result(&result));
    }
    Ok(result.success)
}
