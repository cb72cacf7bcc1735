use std::fs;

use seedling::config::GlobalDefaults;
use seedling::error::Error;
use seedling::hooks::{GitInitHook, InstallHook, PostGenerateHook};
use seedling::resolver::{resolve, SubstitutionContext, UserInput};
use seedling::template::{BuildTool, Framework, Template};
use tempfile::TempDir;

fn context() -> SubstitutionContext {
    let template = Template::new("demo", Framework::Nodejs, BuildTool::Tsup);
    let input = UserInput {
        author: Some("Ada Lovelace".to_string()),
        email: Some("ada@example.com".to_string()),
        ..UserInput::new("demo")
    };
    resolve(&template, &input, &GlobalDefaults::default()).unwrap()
}

#[test]
fn test_hook_names() {
    assert_eq!(InstallHook::new().name(), "install");
    assert_eq!(GitInitHook::default().name(), "git");
}

#[test]
fn test_install_hook_missing_program() {
    let temp_dir = TempDir::new().unwrap();
    let hook = InstallHook::with_program("seedling-no-such-package-manager");

    match hook.run(temp_dir.path(), &context()) {
        Err(Error::HookError { hook, message }) => {
            assert_eq!(hook, "install");
            assert!(message.contains("seedling-no-such-package-manager"));
        }
        other => panic!("expected HookError, got {other:?}"),
    }
}

#[test]
fn test_git_init_hook_commits_files() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("README.md"), "# demo\n").unwrap();
    fs::create_dir_all(temp_dir.path().join("src")).unwrap();
    fs::write(temp_dir.path().join("src/index.ts"), "export {};\n").unwrap();

    GitInitHook::with_message("chore: scaffold").run(temp_dir.path(), &context()).unwrap();

    let repo = git2::Repository::open(temp_dir.path()).unwrap();
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    assert_eq!(head.message(), Some("chore: scaffold"));
    let tree = head.tree().unwrap();
    assert!(tree.get_name("README.md").is_some());
    assert!(tree.get_path(std::path::Path::new("src/index.ts")).is_ok());
}
