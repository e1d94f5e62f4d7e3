//! Cache Entry Module
//!
//! Defines the structure for individual cache entries and their byte cost.

use crate::cache::ByteView;

// == Cache Entry ==
/// A single resident value together with the bytes it is charged against the budget.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored value
    pub value: ByteView,
    /// Key length plus value length
    pub size: usize,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry, charging it `key.len() + value.len()` bytes.
    pub fn new(key: &str, value: ByteView) -> Self {
        let size = entry_size(key, &value);
        Self { value, size }
    }
}

// == Utility Functions ==
/// Returns the number of bytes an entry occupies in the budget.
pub fn entry_size(key: &str, value: &ByteView) -> usize {
    key.len() + value.len()
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_size_counts_key_and_value() {
        let entry = CacheEntry::new("tom", ByteView::from("660"));
        assert_eq!(entry.size, 6);
        assert_eq!(entry.value.to_string(), "660");
    }

    #[test]
    fn test_entry_size_empty_value() {
        let entry = CacheEntry::new("key", ByteView::default());
        assert_eq!(entry.size, 3);
    }
}
