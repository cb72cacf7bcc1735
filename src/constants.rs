//! Common constants used throughout Seedling.

/// Supported template manifest file names, tried in order.
pub const MANIFEST_FILES: [&str; 3] = ["template.json", "template.yml", "template.yaml"];

/// Directory inside a template that holds the files listed in its manifest.
pub const TEMPLATE_FILES_DIR: &str = "files";

/// Environment variable overriding the templates root.
pub const TEMPLATES_DIR_ENV: &str = "SEEDLING_TEMPLATES_DIR";

/// Templates shipped with the crate.
pub const BUNDLED_TEMPLATES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/templates");

/// Name of the emitted package manifest.
pub const PACKAGE_JSON: &str = "package.json";

/// Files whose content is copied verbatim unless the manifest says otherwise.
pub const LITERAL_PATTERNS: [&str; 12] = [
    "**/*.png",
    "**/*.jpg",
    "**/*.jpeg",
    "**/*.gif",
    "**/*.ico",
    "**/*.webp",
    "**/*.woff",
    "**/*.woff2",
    "**/*.ttf",
    "**/*.eot",
    "**/*.otf",
    "**/*.zip",
];

/// Globals provided by the template engine; never reported as placeholders.
pub const ENGINE_GLOBALS: [&str; 5] = ["range", "dict", "debug", "namespace", "loop"];

pub const DEFAULT_LICENSE: &str = "MIT";
pub const DEFAULT_VERSION: &str = "1.0.0";

/// npm refuses package names longer than this.
pub const MAX_PACKAGE_NAME_LEN: usize = 214;
