// src/core/knowledge.rs — Knowledge-base corpus and the file boundary

use std::path::Path;

use crate::infra::errors::CharlaError;

/// Accepted reference-document kinds, judged by the file's declared type
/// (its extension).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    PlainText,
    Markdown,
    Csv,
}

impl FileKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "txt" => Some(FileKind::PlainText),
            "md" | "markdown" => Some(FileKind::Markdown),
            "csv" => Some(FileKind::Csv),
            _ => None,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            FileKind::PlainText => "text/plain",
            FileKind::Markdown => "text/markdown",
            FileKind::Csv => "text/csv",
        }
    }
}

/// Read the full text of a reference document. Undeclared kinds are rejected
/// before the filesystem is touched.
pub async fn read_knowledge_file(path: &Path) -> Result<String, CharlaError> {
    if FileKind::from_path(path).is_none() {
        return Err(CharlaError::UnsupportedFile);
    }
    tokio::fs::read_to_string(path).await.map_err(|e| {
        tracing::warn!("no se pudo leer {}: {e}", path.display());
        CharlaError::FileRead {
            detail: e.to_string(),
        }
    })
}

/// Applied knowledge-base state. Unlike the persona there is no staged copy:
/// a loaded file replaces the corpus wholesale, a rejected one clears it.
/// `file_error` belongs to the upload control and never reaches the global
/// error field.
#[derive(Debug, Default)]
pub struct KnowledgeBase {
    content: String,
    file_name: Option<String>,
    file_error: Option<String>,
}

impl KnowledgeBase {
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_loaded(&self) -> bool {
        !self.content.is_empty()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn file_error(&self) -> Option<&str> {
        self.file_error.as_deref()
    }

    /// Accept a corpus. Returns whether the stored value changed.
    pub(crate) fn accept(&mut self, file_name: String, content: String) -> bool {
        self.file_error = None;
        self.file_name = Some(file_name);
        if self.content == content {
            return false;
        }
        self.content = content;
        true
    }

    /// Reject the load: clear the corpus and keep a local error. Returns
    /// whether the stored value changed.
    pub(crate) fn reject(&mut self, error: String) -> bool {
        self.file_error = Some(error);
        self.file_name = None;
        if self.content.is_empty() {
            return false;
        }
        self.content.clear();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(
            FileKind::from_path(Path::new("notas.txt")),
            Some(FileKind::PlainText)
        );
        assert_eq!(
            FileKind::from_path(Path::new("manual.MD")),
            Some(FileKind::Markdown)
        );
        assert_eq!(
            FileKind::from_path(Path::new("docs/guía.markdown")),
            Some(FileKind::Markdown)
        );
        assert_eq!(
            FileKind::from_path(Path::new("precios.csv")),
            Some(FileKind::Csv)
        );
    }

    #[test]
    fn test_kind_rejects_everything_else() {
        assert_eq!(FileKind::from_path(Path::new("archivo.zip")), None);
        assert_eq!(FileKind::from_path(Path::new("foto.png")), None);
        assert_eq!(FileKind::from_path(Path::new("sin_extension")), None);
    }

    #[test]
    fn test_mime_names() {
        assert_eq!(FileKind::PlainText.mime(), "text/plain");
        assert_eq!(FileKind::Markdown.mime(), "text/markdown");
        assert_eq!(FileKind::Csv.mime(), "text/csv");
    }

    #[tokio::test]
    async fn test_read_accepted_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notas.txt");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "El horario es de 9 a 18.").unwrap();

        let content = read_knowledge_file(&path).await.unwrap();
        assert!(content.contains("El horario es de 9 a 18."));
    }

    #[tokio::test]
    async fn test_read_rejects_unsupported_kind_without_touching_fs() {
        // The path does not exist; the kind check fires first.
        let err = read_knowledge_file(&PathBuf::from("inexistente.zip"))
            .await
            .unwrap_err();
        assert!(matches!(err, CharlaError::UnsupportedFile));
    }

    #[tokio::test]
    async fn test_read_failure_is_a_file_error() {
        let err = read_knowledge_file(&PathBuf::from("/no/existe/notas.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, CharlaError::FileRead { .. }));
        assert_eq!(err.to_string(), "Error al leer el archivo.");
    }

    #[test]
    fn test_accept_replaces_wholesale() {
        let mut kb = KnowledgeBase::default();
        assert!(kb.accept("a.txt".into(), "uno".into()));
        assert!(kb.accept("b.txt".into(), "dos".into()));
        assert_eq!(kb.content(), "dos");
        assert_eq!(kb.file_name(), Some("b.txt"));
        assert!(kb.file_error().is_none());
    }

    #[test]
    fn test_accept_identical_content_reports_unchanged() {
        let mut kb = KnowledgeBase::default();
        assert!(kb.accept("a.txt".into(), "uno".into()));
        assert!(!kb.accept("a.txt".into(), "uno".into()));
    }

    #[test]
    fn test_reject_clears_corpus() {
        let mut kb = KnowledgeBase::default();
        kb.accept("a.txt".into(), "uno".into());
        assert!(kb.reject("Archivo no soportado. Sube archivos .txt, .md o .csv.".into()));
        assert!(!kb.is_loaded());
        assert!(kb.file_name().is_none());
        assert!(kb.file_error().unwrap().contains("no soportado"));
    }

    #[test]
    fn test_reject_when_already_empty_reports_unchanged() {
        let mut kb = KnowledgeBase::default();
        assert!(!kb.reject("Error al leer el archivo.".into()));
        assert!(kb.file_error().is_some());
    }
}
