use std::collections::HashSet;

use crate::batcher::check_item_sizes;
use crate::error::{Result, UploadError};
use crate::file::SizedItem;
use crate::limits::UploadLimits;

/// Pre-flight checks run before any request is made.
///
/// `existing` holds the file names the caller already knows about; a new
/// file with one of those names is a duplicate, as is a name repeated
/// inside the selection itself.
pub fn validate_selection<T, I, S>(
    files: &[T],
    existing: I,
    description: &str,
    limits: &UploadLimits,
) -> Result<()>
where
    T: SizedItem,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if files.is_empty() {
        return Err(UploadError::EmptySelection {
            kinds: limits.accepted_kinds(),
        });
    }

    if files.len() > limits.max_files {
        return Err(UploadError::TooManyFiles {
            count: files.len(),
            max: limits.max_files,
        });
    }

    let known: HashSet<String> = existing
        .into_iter()
        .map(|name| name.as_ref().to_string())
        .collect();

    if known.len() + files.len() > limits.max_files {
        return Err(UploadError::CollectionFull {
            adding: files.len(),
            existing: known.len(),
            max: limits.max_files,
        });
    }

    if let Some(file) = files.iter().find(|f| !limits.accepts(f.name())) {
        return Err(UploadError::UnsupportedFileType {
            name: file.name().to_string(),
            kinds: limits.accepted_kinds(),
        });
    }

    let mut seen = HashSet::with_capacity(files.len());
    let mut duplicates = Vec::new();
    for file in files {
        let name = file.name();
        let repeated = !seen.insert(name);
        if (repeated || known.contains(name)) && !duplicates.iter().any(|d| d == name) {
            duplicates.push(name.to_string());
        }
    }
    if !duplicates.is_empty() {
        return Err(UploadError::DuplicateFiles(duplicates));
    }

    check_item_sizes(files, limits.max_file_bytes)?;

    if limits.require_description && description.trim().is_empty() {
        return Err(UploadError::MissingDescription);
    }

    Ok(())
}
