//! Loader trait for writing batches to a destination

use crate::warehouse::WriteMode;
use eyre::Result;

/// Loader trait for writing a batch of items to a destination table
///
/// Each call is one load: `mode` decides whether the batch replaces the
/// table contents or is appended to them.
///
/// # Example
/// ```no_run
/// use isams_etl::etl::{Loader, Record};
/// use isams_etl::warehouse::WriteMode;
/// use eyre::Result;
///
/// struct CountingLoader;
///
/// impl Loader for CountingLoader {
///     type Item = Record;
///
///     async fn load(&self, items: Vec<Self::Item>, mode: WriteMode) -> Result<usize> {
///         println!("{} rows ({mode})", items.len());
///         Ok(items.len())
///     }
/// }
/// ```
pub trait Loader: Send + Sync {
    /// The type of items to load
    type Item: Send;

    /// Load one batch and return the number of rows written
    ///
    /// # Errors
    /// Returns an error if the destination rejects the batch
    fn load(
        &self,
        items: Vec<Self::Item>,
        mode: WriteMode,
    ) -> impl std::future::Future<Output = Result<usize>> + Send;
}
