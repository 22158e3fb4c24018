use crate::error::{QuoteDocError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

pub trait DownloadSink {
    /// Returns where the bytes ended up, if the sink has a location.
    fn deliver(&mut self, file_name: &str, bytes: &[u8]) -> Result<Option<PathBuf>>;
}

#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&mut self, file_name: &str, bytes: &[u8]) -> Result<Option<PathBuf>> {
        let target = self.dir.join(file_name);
        // The temp file is removed when dropped, so a failed write leaves nothing behind.
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.flush()?;
        tmp.persist(&target)
            .map_err(|err| QuoteDocError::Persist(format!("{}: {}", target.display(), err)))?;
        log::info!("saved {} ({} bytes)", target.display(), bytes.len());
        Ok(Some(target))
    }
}

#[derive(Debug, Default)]
pub struct MemorySink {
    files: Vec<(String, Vec<u8>)>,
}

impl MemorySink {
    pub fn files(&self) -> &[(String, Vec<u8>)] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl DownloadSink for MemorySink {
    fn deliver(&mut self, file_name: &str, bytes: &[u8]) -> Result<Option<PathBuf>> {
        self.files.push((file_name.to_string(), bytes.to_vec()));
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_sink_writes_under_the_download_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path());
        let path = sink.deliver("Quote.pdf", b"%PDF-1.7").unwrap().unwrap();
        assert_eq!(path, dir.path().join("Quote.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.7");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn directory_sink_fails_cleanly_for_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path().join("nope"));
        assert!(sink.deliver("Quote.pdf", b"x").is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
