//! Extractor trait for paged data extraction

use super::{PageRequest, Pagination, Totals};
use eyre::Result;

/// Extractor trait for pulling records out of a source
///
/// A source is either single-page (one call returns everything) or
/// multi-page, in which case the driver first calls [`Extractor::probe`] to
/// learn the totals and then walks the pages in ascending order.
///
/// # Example
/// ```no_run
/// use isams_etl::etl::{Extractor, PageRequest, Pagination, Totals};
/// use eyre::Result;
///
/// struct FixedExtractor {
///     rows: Vec<u32>,
/// }
///
/// impl Extractor for FixedExtractor {
///     type Item = u32;
///
///     fn pagination(&self) -> Pagination {
///         Pagination::Single
///     }
///
///     async fn probe(&self) -> Result<Totals> {
///         Ok(Totals::new(self.rows.len() as u64, 1))
///     }
///
///     async fn extract(&self, _page: Option<PageRequest>) -> Result<Vec<Self::Item>> {
///         Ok(self.rows.clone())
///     }
/// }
/// ```
pub trait Extractor: Send + Sync {
    /// The type of items extracted
    type Item: Send;

    /// How the source is paged
    fn pagination(&self) -> Pagination;

    /// Learn total record and page counts before paging
    ///
    /// Only called for [`Pagination::Multi`] sources.
    fn probe(&self) -> impl std::future::Future<Output = Result<Totals>> + Send;

    /// Extract one page of items, or everything when `page` is `None`
    ///
    /// # Errors
    /// Returns an error if extraction fails (network, permission, payload shape)
    fn extract(
        &self,
        page: Option<PageRequest>,
    ) -> impl std::future::Future<Output = Result<Vec<Self::Item>>> + Send;
}
