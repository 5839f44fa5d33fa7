use crate::constants::CONVERSION_MATRIX;
use crate::engine::FormatRegistry;
use std::collections::{HashMap, HashSet};

/// Registry backed by the static conversion matrix.
#[derive(Debug, Default, Clone)]
pub struct BuiltinRegistry;

impl BuiltinRegistry {
    pub fn new() -> Self {
        Self
    }
}

impl FormatRegistry for BuiltinRegistry {
    fn list_supported_formats(&self) -> HashMap<String, HashSet<String>> {
        CONVERSION_MATRIX
            .iter()
            .map(|(source, targets)| {
                (
                    (*source).to_string(),
                    targets.iter().map(|t| (*t).to_string()).collect(),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_source_has_targets() {
        let formats = BuiltinRegistry::new().list_supported_formats();
        assert!(!formats.is_empty());
        for (source, targets) in &formats {
            assert!(!targets.is_empty(), "{} has no targets", source);
            assert!(!targets.contains(source), "{} converts to itself", source);
        }
    }

    #[test]
    fn common_document_conversions_present() {
        let formats = BuiltinRegistry::new().list_supported_formats();
        assert!(formats["pdf"].contains("txt"));
        assert!(formats["md"].contains("html"));
        assert!(formats["docx"].contains("pdf"));
    }
}
