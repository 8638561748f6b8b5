//! Extractor trait: the fetch half of a worker

use eyre::Result;

/// Pulls items from a source one batch at a time
///
/// # Example
/// ```no_run
/// use looker_activity_extractor::etl::Extractor;
/// use eyre::Result;
///
/// struct Countdown(u32);
///
/// impl Extractor for Countdown {
///     type Item = u32;
///
///     async fn fetch(&mut self) -> Result<Option<Self::Item>> {
///         if self.0 == 0 {
///             return Ok(None);
///         }
///         self.0 -= 1;
///         Ok(Some(self.0))
///     }
/// }
/// ```
pub trait Extractor {
    /// The type of items extracted
    type Item: Send;

    /// Fetch the next item, or `None` once the source is exhausted
    ///
    /// # Errors
    /// Returns an error if extraction fails (network, remote query, parsing, etc.)
    fn fetch(&mut self) -> impl std::future::Future<Output = Result<Option<Self::Item>>> + Send;
}
