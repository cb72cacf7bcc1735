use std::io;
use std::path::PathBuf;

use seedling::error::{Error, ErrorCode};

#[test]
fn test_error_conversion() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let error: Error = io_error.into();

    assert!(matches!(error, Error::IoError(_)));
    assert_eq!(error.code(), ErrorCode::Io);
}

#[test]
fn test_error_display() {
    let error = Error::TemplateNotFoundError { name: "angular".to_string() };
    assert_eq!(error.to_string(), "Template 'angular' not found.");

    let error = Error::TargetNotEmptyError {
        target: PathBuf::from("out"),
        conflicts: vec![PathBuf::from("a.txt"), PathBuf::from("src")],
    };
    assert_eq!(error.to_string(), "Target directory 'out' is not empty (found: a.txt, src).");

    let error = Error::MissingPlaceholdersError {
        template: "demo".to_string(),
        keys: vec!["apiKey".to_string(), "port".to_string()],
    };
    assert_eq!(error.to_string(), "Template 'demo' uses undefined placeholders: apiKey, port.");
}

#[test]
fn test_error_codes_and_details() {
    let error = Error::UnresolvedPlaceholderError {
        key: "apiUrl".to_string(),
        file: PathBuf::from("src/env.ts"),
    };
    assert_eq!(error.code(), ErrorCode::UnresolvedPlaceholder);
    assert_eq!(error.details(), vec!["apiUrl".to_string(), "src/env.ts".to_string()]);

    assert_eq!(Error::CancelledError.code(), ErrorCode::Cancelled);
    assert!(Error::CancelledError.details().is_empty());
    assert_eq!(
        serde_json::to_value(ErrorCode::DuplicateTemplate).unwrap(),
        serde_json::json!("DUPLICATE_TEMPLATE")
    );
}
