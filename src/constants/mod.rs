// App Constants
pub const APP_NAME: &str = "ConverText";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// UI
pub const PROGRESS_POLL_INTERVAL_MS: u64 = 100;
pub const MAX_LOG_LINES: usize = 1000;

// File handling
pub const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "docx", "doc", "txt", "md", "html", "htm", "epub", "rtf", "odt",
];

// Supported conversions - source format -> target formats
pub const CONVERSION_MATRIX: &[(&str, &[&str])] = &[
    ("pdf", &["txt", "md", "html"]),
    ("docx", &["pdf", "txt", "md", "html", "epub"]),
    ("doc", &["txt", "md", "html"]),
    ("txt", &["md", "html", "pdf"]),
    ("md", &["html", "pdf", "epub", "docx", "txt"]),
    ("html", &["md", "txt", "pdf", "epub"]),
    ("epub", &["txt", "md", "html", "pdf"]),
    ("rtf", &["txt", "md", "html"]),
    ("odt", &["txt", "md", "html", "pdf"]),
];
