use std::fs;
use std::path::PathBuf;

use seedling::constants::BUNDLED_TEMPLATES_DIR;
use seedling::error::Error;
use seedling::registry::TemplateRegistry;
use seedling::template::{BuildTool, Framework, Template, TemplateFile};
use tempfile::TempDir;

#[test]
fn test_load_bundled_templates() {
    let registry = TemplateRegistry::load(BUNDLED_TEMPLATES_DIR).unwrap();

    assert_eq!(registry.len(), 5);
    assert_eq!(
        registry.names().collect::<Vec<_>>(),
        vec!["component-library", "nodejs-api", "react-basic", "vue2-basic", "vue3-basic"]
    );

    let template = registry.get_template("nodejs-api").unwrap();
    assert_eq!(template.framework, Framework::Nodejs);
    assert_eq!(template.build_tool, BuildTool::Tsup);
    assert_eq!(template.dependencies.get("express").map(String::as_str), Some("^4.18.0"));
}

#[test]
fn test_registration_order_is_kept() {
    let registry = TemplateRegistry::new([
        Template::new("zeta", Framework::React, BuildTool::Vite),
        Template::new("alpha", Framework::Vue3, BuildTool::Vite),
    ])
    .unwrap();

    let names: Vec<&str> = registry.list_templates().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["zeta", "alpha"]);
}

#[test]
fn test_duplicate_template_name() {
    let result = TemplateRegistry::new([
        Template::new("vue3-basic", Framework::Vue3, BuildTool::Vite),
        Template::new("vue3-basic", Framework::Vue3, BuildTool::Rollup),
    ]);

    match result {
        Err(Error::DuplicateTemplateError { name }) => assert_eq!(name, "vue3-basic"),
        other => panic!("expected DuplicateTemplateError, got {other:?}"),
    }
}

#[test]
fn test_rejects_non_kebab_case_name() {
    let result = TemplateRegistry::new([Template::new("Vue3_Basic", Framework::Vue3, BuildTool::Vite)]);
    assert!(matches!(result, Err(Error::ConfigError(_))));
}

#[test]
fn test_rejects_escaping_file_path() {
    let mut template = Template::new("escape", Framework::Nodejs, BuildTool::Tsup);
    template.files.push(TemplateFile::templated("../../etc/passwd", "x"));

    match TemplateRegistry::new([template]) {
        Err(Error::PathTraversalError { path }) => {
            assert_eq!(path, PathBuf::from("../../etc/passwd"))
        }
        other => panic!("expected PathTraversalError, got {other:?}"),
    }
}

#[test]
fn test_get_template_not_found() {
    let registry = TemplateRegistry::new([Template::new("react-basic", Framework::React, BuildTool::Vite)])
        .unwrap();

    match registry.get_template("angular") {
        Err(Error::TemplateNotFoundError { name }) => assert_eq!(name, "angular"),
        other => panic!("expected TemplateNotFoundError, got {other:?}"),
    }
}

#[test]
fn test_load_skips_directories_without_manifest() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    fs::create_dir_all(root.join("notes")).unwrap();
    fs::write(root.join("README.md"), "not a template").unwrap();
    fs::create_dir_all(root.join("api/files")).unwrap();
    fs::write(root.join("api/files/index.js"), "console.log('{{ projectName }}');\n").unwrap();
    fs::write(
        root.join("api/template.yml"),
        "name: api\nframework: nodejs\nbuildTool: tsup\nfiles: [index.js]\n",
    )
    .unwrap();

    let registry = TemplateRegistry::load(root).unwrap();
    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["api"]);
}

#[test]
fn test_load_missing_root() {
    let temp_dir = TempDir::new().unwrap();
    let result = TemplateRegistry::load(temp_dir.path().join("nowhere"));
    assert!(matches!(result, Err(Error::ConfigError(_))));
}

#[test]
fn test_empty_registry() {
    let registry = TemplateRegistry::new(Vec::new()).unwrap();
    assert!(registry.is_empty());
    assert_eq!(registry.list_templates().count(), 0);
}

#[test]
fn test_manifest_paths_are_normalized() {
    let mut template = Template::new("dotted", Framework::Nodejs, BuildTool::Tsup);
    template.files.push(TemplateFile::templated("./package.json", "{}"));
    template.files.push(TemplateFile::templated("src/./index.ts", "export {};"));
    let registry = TemplateRegistry::new([template]).unwrap();

    let template = registry.get_template("dotted").unwrap();
    let paths: Vec<PathBuf> = template.files.iter().map(|f| f.path.clone()).collect();
    assert_eq!(paths, vec![PathBuf::from("package.json"), PathBuf::from("src/index.ts")]);
    assert!(template.emits("package.json"));
}

#[test]
fn test_rejects_duplicate_file_paths() {
    let mut template = Template::new("twice", Framework::Nodejs, BuildTool::Tsup);
    template.files.push(TemplateFile::templated("src/index.ts", "a"));
    template.files.push(TemplateFile::templated("./src/index.ts", "b"));

    assert!(matches!(TemplateRegistry::new([template]), Err(Error::ConfigError(_))));
}
