//! Loader trait: the dump half of a worker

use eyre::Result;

/// Persists items produced by an [`Extractor`](super::Extractor)
pub trait Loader {
    /// The type of items to load
    type Item;

    /// Persist one item
    ///
    /// Returns the number of records written
    ///
    /// # Errors
    /// Returns an error if writing fails
    fn dump(&mut self, item: Self::Item) -> Result<usize>;
}
