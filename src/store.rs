use crate::error::{QuoteDocError, Result};
use crate::model::Document;
use std::io::Write;
use std::path::{Path, PathBuf};

pub trait TemplateStore {
    fn persist(&mut self, document: &Document) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    revisions: Vec<Document>,
}

impl MemoryStore {
    pub fn revisions(&self) -> &[Document] {
        &self.revisions
    }

    pub fn last(&self) -> Option<&Document> {
        self.revisions.last()
    }
}

impl TemplateStore for MemoryStore {
    fn persist(&mut self, document: &Document) -> Result<()> {
        self.revisions.push(document.clone());
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Document> {
        let json = std::fs::read_to_string(&self.path)?;
        Document::from_json(&json)
    }
}

impl TemplateStore for JsonFileStore {
    fn persist(&mut self, document: &Document) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let json = document.to_json_pretty()?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&self.path)
            .map_err(|err| QuoteDocError::Persist(format!("{}: {}", self.path.display(), err)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::EditorSession;

    #[test]
    fn json_store_round_trips_saved_edits() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("template.json"));
        let mut session = EditorSession::new(Document::standard_template());
        session.toggle_edit();
        session.update_item_text(6, 4, "Job Reference: 1 / 2");
        session.save(&mut store).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(&loaded, session.document());
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn json_store_reports_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("missing").join("template.json"));
        let err = store.persist(&Document::standard_template()).unwrap_err();
        assert!(matches!(err, QuoteDocError::Io(_)));
    }
}
