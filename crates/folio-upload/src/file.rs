use std::path::{Path, PathBuf};

/// Anything the batcher can pack: a name for error messages and a byte size
pub trait SizedItem {
    fn name(&self) -> &str;
    fn size(&self) -> u64;
}

/// Where a file's bytes come from
#[derive(Debug, Clone, PartialEq)]
enum FileSource {
    Memory(Vec<u8>),
    /// Read lazily when its batch is sent, so only one batch is resident
    Path(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    name: String,
    size: u64,
    source: FileSource,
}

impl UploadFile {
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            source: FileSource::Memory(bytes),
        }
    }

    /// Stat a file on disk; its content is not read yet
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            name,
            size: metadata.len(),
            source: FileSource::Path(path.to_path_buf()),
        })
    }

    pub async fn read(&self) -> std::io::Result<Vec<u8>> {
        match &self.source {
            FileSource::Memory(bytes) => Ok(bytes.clone()),
            FileSource::Path(path) => tokio::fs::read(path).await,
        }
    }

    pub fn content_type(&self) -> &'static str {
        if self.name.to_ascii_lowercase().ends_with(".pdf") {
            "application/pdf"
        } else {
            "application/octet-stream"
        }
    }
}

impl SizedItem for UploadFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }
}

pub(crate) fn total_size<T: SizedItem>(items: &[T]) -> u64 {
    items.iter().map(SizedItem::size).sum()
}
