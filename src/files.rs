use crate::constants::DOCUMENT_EXTENSIONS;
use std::path::{Component, Path, PathBuf};

/// Ordered set of files queued for conversion. Insertion order is the
/// order the user added them and is never changed by later operations.
#[derive(Debug, Default, Clone)]
pub struct FileCollection {
    files: Vec<PathBuf>,
}

impl FileCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends each path that is not already present, comparing normalized
    /// paths. Duplicates are skipped silently. Returns how many were added.
    pub fn add<I>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut added = 0;
        for path in paths {
            if self.contains(&path) {
                tracing::debug!("skipping duplicate {}", path.display());
                continue;
            }
            self.files.push(path);
            added += 1;
        }
        added
    }

    /// Removes the file if present. Removing an absent path is a no-op.
    pub fn remove(&mut self, path: &Path) -> bool {
        let normalized = normalize(path);
        if let Some(pos) = self.files.iter().position(|f| normalize(f) == normalized) {
            self.files.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn contains(&self, path: &Path) -> bool {
        let normalized = normalize(path);
        self.files.iter().any(|f| normalize(f) == normalized)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.files.iter()
    }

    pub fn first(&self) -> Option<&PathBuf> {
        self.files.first()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn to_vec(&self) -> Vec<PathBuf> {
        self.files.clone()
    }
}

/// Lexical cleanup: drops `.` components and resolves `..` against the
/// preceding component where possible. No filesystem access.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component.as_os_str());
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Short name for status lines and logs.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Best-effort check that an added file is a document we know how to
/// handle. Advisory only: callers log a warning but still accept the file.
pub fn looks_like_document(path: &Path) -> bool {
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        if DOCUMENT_EXTENSIONS.contains(&ext.to_lowercase().as_str()) {
            return true;
        }
    }

    // Fall back to sniffing the content when the extension is unfamiliar.
    match std::fs::read(path) {
        Ok(buffer) => {
            let head = &buffer[..buffer.len().min(8192)];
            match infer::get(head) {
                Some(kind) => matches!(
                    kind.mime_type(),
                    "application/pdf"
                        | "application/epub+zip"
                        | "application/rtf"
                        | "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
                        | "application/vnd.oasis.opendocument.text"
                        | "text/html"
                ),
                // Plain text has no magic bytes; give it the benefit of
                // the doubt.
                None => true,
            }
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_preserves_insertion_order() {
        let mut files = FileCollection::new();
        files.add(vec![
            PathBuf::from("/tmp/b.pdf"),
            PathBuf::from("/tmp/a.docx"),
            PathBuf::from("/tmp/c.md"),
        ]);

        let order: Vec<_> = files.iter().map(|p| display_name(p)).collect();
        assert_eq!(order, vec!["b.pdf", "a.docx", "c.md"]);
    }

    #[test]
    fn duplicate_adds_are_skipped() {
        let mut files = FileCollection::new();
        files.add(vec![PathBuf::from("/tmp/a.pdf")]);
        files.add(vec![PathBuf::from("/tmp/a.pdf")]);

        assert_eq!(files.len(), 1);
    }

    #[test]
    fn duplicates_detected_after_normalization() {
        let mut files = FileCollection::new();
        files.add(vec![PathBuf::from("/tmp/a.pdf")]);
        let added = files.add(vec![PathBuf::from("/tmp/./a.pdf")]);

        assert_eq!(added, 0);
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn remove_missing_path_is_a_noop() {
        let mut files = FileCollection::new();
        files.add(vec![PathBuf::from("/tmp/a.pdf")]);

        assert!(!files.remove(Path::new("/tmp/other.pdf")));
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn remove_keeps_remaining_order() {
        let mut files = FileCollection::new();
        files.add(vec![
            PathBuf::from("/tmp/a.pdf"),
            PathBuf::from("/tmp/b.pdf"),
            PathBuf::from("/tmp/c.pdf"),
        ]);

        assert!(files.remove(Path::new("/tmp/b.pdf")));
        let order: Vec<_> = files.iter().map(|p| display_name(p)).collect();
        assert_eq!(order, vec!["a.pdf", "c.pdf"]);
    }

    #[test]
    fn clear_empties_the_collection() {
        let mut files = FileCollection::new();
        files.add(vec![PathBuf::from("/tmp/a.pdf"), PathBuf::from("/tmp/b.pdf")]);
        files.clear();

        assert!(files.is_empty());
    }

    #[test]
    fn known_extension_counts_as_document() {
        assert!(looks_like_document(Path::new("/nonexistent/report.docx")));
        assert!(looks_like_document(Path::new("/nonexistent/notes.MD")));
    }

    #[test]
    fn unreadable_unknown_extension_does_not() {
        assert!(!looks_like_document(Path::new("/nonexistent/movie.mp4")));
    }
}
