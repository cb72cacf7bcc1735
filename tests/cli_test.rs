use std::cell::RefCell;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use seedling::cli::{
    choose_template, collect_input, confirm_overwrite, default_project_name, format_result,
    format_template_details, format_template_list, load_answers, Args, Command, CreateArgs,
};
use seedling::constants::BUNDLED_TEMPLATES_DIR;
use seedling::error::{Error, Result};
use seedling::generator::GenerationResult;
use seedling::package::PackageManager;
use seedling::prompt::Prompter;
use seedling::registry::TemplateRegistry;
use seedling::template::Feature;
use tempfile::TempDir;

fn make_args(args: &[&str]) -> Vec<OsString> {
    let mut res = vec![OsString::from("seedling")];
    res.extend(args.iter().map(OsString::from));
    res
}

fn create_args(args: &[&str]) -> CreateArgs {
    let mut full = vec!["create"];
    full.extend_from_slice(args);
    match Args::try_parse_from(make_args(&full)).unwrap().command {
        Command::Create(create) => create,
        other => panic!("expected create, got {other:?}"),
    }
}

/// Answers every question from canned values and records what was asked.
#[derive(Default)]
struct ScriptedPrompter {
    name: Option<String>,
    confirm: bool,
    select: usize,
    asked: RefCell<Vec<String>>,
}

impl Prompter for ScriptedPrompter {
    fn input(&self, prompt: &str, default: &str) -> Result<String> {
        self.asked.borrow_mut().push(prompt.to_string());
        Ok(self.name.clone().unwrap_or_else(|| default.to_string()))
    }

    fn confirm(&self, skip: bool, prompt: String) -> Result<bool> {
        if skip {
            return Ok(true);
        }
        self.asked.borrow_mut().push(prompt);
        Ok(self.confirm)
    }

    fn select(&self, prompt: &str, _items: &[String], _default: usize) -> Result<usize> {
        self.asked.borrow_mut().push(prompt.to_string());
        Ok(self.select)
    }
}

#[test]
fn test_list_and_show() {
    let parsed = Args::try_parse_from(make_args(&["list", "--verbose"])).unwrap();
    assert!(matches!(parsed.command, Command::List));
    assert!(parsed.verbose);

    let parsed = Args::try_parse_from(make_args(&["show", "vue3-basic"])).unwrap();
    match parsed.command {
        Command::Show { name } => assert_eq!(name, "vue3-basic"),
        other => panic!("expected show, got {other:?}"),
    }
}

#[test]
fn test_create_basic_args() {
    let args = create_args(&["./output"]);

    assert_eq!(args.output_dir, PathBuf::from("./output"));
    assert!(args.template.is_none());
    assert!(!args.force);
    assert!(!args.skip_install);
    assert!(!args.skip_git);
    assert!(args.interactive());
}

#[test]
fn test_create_all_flags() {
    let args = create_args(&[
        "--template",
        "nodejs-api",
        "--name",
        "Demo API",
        "--license",
        "ISC",
        "--pkg-version",
        "0.2.0",
        "--package-manager",
        "pnpm",
        "--enable",
        "vitest,husky",
        "--disable",
        "eslint",
        "--force",
        "--skip-install",
        "--skip-git",
        "--yes",
        "--json",
        "./output",
    ]);

    assert_eq!(args.template.as_deref(), Some("nodejs-api"));
    assert!(args.force && args.skip_install && args.skip_git && args.json);
    assert!(!args.interactive());

    let input = args.user_input();
    assert_eq!(input.project_name, "Demo API");
    assert_eq!(input.license.as_deref(), Some("ISC"));
    assert_eq!(input.version.as_deref(), Some("0.2.0"));
    assert_eq!(input.package_manager, Some(PackageManager::Pnpm));
    assert_eq!(input.features.get(&Feature::Vitest), Some(&true));
    assert_eq!(input.features.get(&Feature::Husky), Some(&true));
    assert_eq!(input.features.get(&Feature::Eslint), Some(&false));
}

#[test]
fn test_create_requires_output_dir() {
    assert!(Args::try_parse_from(make_args(&["create"])).is_err());
    assert!(Args::try_parse_from(make_args(&["create", "--enable", "blockchain", "out"])).is_err());
}

#[test]
fn test_load_answers() {
    let json = r#"{"projectName": "from-stdin", "author": "Ada", "features": {"pinia": true}}"#;
    let answers = load_answers(json.as_bytes()).unwrap();

    assert_eq!(answers.project_name, "from-stdin");
    assert_eq!(answers.author.as_deref(), Some("Ada"));
    assert_eq!(answers.features.get(&Feature::Pinia), Some(&true));

    assert!(matches!(load_answers(&b"{\"colour\": \"red\"}"[..]), Err(Error::JsonError(_))));
}

#[test]
fn test_default_project_name() {
    assert_eq!(default_project_name("projects/shop-front"), "shop-front");
    assert_eq!(default_project_name("/"), "");
}

#[test]
fn test_collect_input_precedence() {
    let prompt = ScriptedPrompter::default();

    // Flags override stdin answers
    let args = create_args(&["--stdin", "--license", "MIT", "out/app"]);
    let answers = load_answers(&br#"{"projectName": "stdin-app", "license": "ISC"}"#[..]).unwrap();
    let input = collect_input(&prompt, &args, Some(answers)).unwrap();
    assert_eq!(input.project_name, "stdin-app");
    assert_eq!(input.license.as_deref(), Some("MIT"));

    // Non-interactive runs fall back to the directory name
    let args = create_args(&["--yes", "out/my-app"]);
    let input = collect_input(&prompt, &args, None).unwrap();
    assert_eq!(input.project_name, "my-app");
    assert!(prompt.asked.borrow().is_empty());
}

#[test]
fn test_collect_input_prompts_for_name() {
    let prompt = ScriptedPrompter { name: Some("Typed Name".to_string()), ..Default::default() };
    let args = create_args(&["out/app"]);

    let input = collect_input(&prompt, &args, None).unwrap();
    assert_eq!(input.project_name, "Typed Name");
    assert_eq!(*prompt.asked.borrow(), vec!["Project name".to_string()]);
}

#[test]
fn test_choose_template() {
    let registry = TemplateRegistry::load(BUNDLED_TEMPLATES_DIR).unwrap();
    let prompt = ScriptedPrompter { select: 1, ..Default::default() };

    let args = create_args(&["-t", "react-basic", "out"]);
    assert_eq!(choose_template(&prompt, &registry, &args).unwrap(), "react-basic");

    let args = create_args(&["out"]);
    assert_eq!(choose_template(&prompt, &registry, &args).unwrap(), "nodejs-api");

    let args = create_args(&["--yes", "out"]);
    assert!(matches!(
        choose_template(&prompt, &registry, &args),
        Err(Error::ConfigError(_))
    ));
}

#[test]
fn test_confirm_overwrite() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().to_str().unwrap();
    let declining = ScriptedPrompter::default();
    let accepting = ScriptedPrompter { confirm: true, ..Default::default() };

    // Empty directory: nothing to confirm
    assert!(!confirm_overwrite(&declining, &create_args(&[target])).unwrap());
    assert!(declining.asked.borrow().is_empty());

    std::fs::write(temp_dir.path().join("existing.txt"), "x").unwrap();
    assert!(!confirm_overwrite(&declining, &create_args(&[target])).unwrap());
    assert!(confirm_overwrite(&accepting, &create_args(&[target])).unwrap());
    assert!(confirm_overwrite(&declining, &create_args(&["--force", target])).unwrap());
    assert!(!confirm_overwrite(&accepting, &create_args(&["--yes", target])).unwrap());
}

#[test]
fn test_format_template_list_and_details() {
    let registry = TemplateRegistry::load(BUNDLED_TEMPLATES_DIR).unwrap();

    let list = format_template_list(&registry);
    assert_eq!(list.lines().count(), registry.len());
    assert!(list.lines().any(|line| line.starts_with("vue3-basic") && line.contains("vite")));

    let details = format_template_details(registry.get_template("vue3-basic").unwrap());
    assert!(details.starts_with("Vue 3 + Vite (vue3-basic) v1.2.0"));
    assert!(details.contains("features:   typescript, pinia, eslint"));
    assert!(details.contains("  public/favicon.ico (literal)"));
}

#[test]
fn test_format_result() {
    let result = GenerationResult {
        success: true,
        project_path: PathBuf::from("out"),
        files: vec![PathBuf::from("package.json")],
        error: None,
        warnings: vec!["install: boom".to_string()],
        duration: Duration::from_millis(12),
    };

    let text = format_result(&result);
    assert!(text.contains("Created: 'out/package.json'"));
    assert!(text.contains("Warning: install: boom"));
    assert!(text.contains("Project generated successfully in out (12 ms)."));
}
