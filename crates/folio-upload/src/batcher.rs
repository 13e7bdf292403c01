use crate::error::{Result, UploadError};
use crate::file::SizedItem;

/// A contiguous run of items sent in one request
#[derive(Debug, PartialEq)]
pub struct Batch<'a, T> {
    pub index: usize,
    pub items: &'a [T],
    pub bytes: u64,
}

impl<'a, T> Batch<'a, T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Reject the first item above `per_item_limit`
pub fn check_item_sizes<T: SizedItem>(items: &[T], per_item_limit: u64) -> Result<()> {
    match items.iter().find(|item| item.size() > per_item_limit) {
        Some(item) => Err(UploadError::OversizedItem {
            name: item.name().to_string(),
            size: item.size(),
            limit: per_item_limit,
        }),
        None => Ok(()),
    }
}

/// Split `items` into the fewest ordered batches whose sums stay within `batch_limit`.
///
/// Greedy left-to-right: the current batch grows while the next item fits and
/// is closed otherwise. Items are never split or reordered. Every item is
/// checked against `per_item_limit` before any batch is formed.
///
/// When `per_item_limit` is above `batch_limit`, an item larger than the
/// batch ceiling travels alone in its own batch.
pub fn partition<T: SizedItem>(
    items: &[T],
    per_item_limit: u64,
    batch_limit: u64,
) -> Result<Vec<Batch<'_, T>>> {
    check_item_sizes(items, per_item_limit)?;

    let mut batches = Vec::new();
    let mut start = 0;
    let mut running = 0u64;

    for (pos, item) in items.iter().enumerate() {
        let size = item.size();

        if pos > start && running + size > batch_limit {
            batches.push(Batch {
                index: batches.len(),
                items: &items[start..pos],
                bytes: running,
            });
            start = pos;
            running = 0;
        }

        running += size;
    }

    if start < items.len() {
        batches.push(Batch {
            index: batches.len(),
            items: &items[start..],
            bytes: running,
        });
    }

    Ok(batches)
}
