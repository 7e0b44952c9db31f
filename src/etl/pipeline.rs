//! Pipeline orchestration for paged extract-load runs

use super::{Extractor, Loader, PageCursor, Pagination, Progress, Totals, Transformer};
use crate::warehouse::{TruncateOnce, WriteMode};
use eyre::{Result, WrapErr};
use owo_colors::OwoColorize;

/// What a pipeline run did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// At least one batch was written
    Loaded {
        rows: usize,
        pages: u64,
        progress: Progress,
    },
    /// The source reported nothing to fetch; no load was attempted
    Empty { totals: Totals },
}

impl RunOutcome {
    pub fn rows(&self) -> usize {
        match self {
            Self::Loaded { rows, .. } => *rows,
            Self::Empty { .. } => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty { .. })
    }
}

/// Pipeline that drives an extractor, transformer and loader over every page
///
/// Single-page sources are written with one TRUNCATE load. Multi-page sources
/// are probed for totals first; the first page truncates the table and every
/// later page appends to it.
///
/// # Example
/// ```no_run
/// use isams_etl::etl::Pipeline;
/// use isams_etl::isams::{DatasetId, EndpointExtractor};
/// use isams_etl::transform::for_dataset;
/// use isams_etl::warehouse::WarehouseLoader;
/// # async fn example(ctx: &isams_etl::JobContext) -> eyre::Result<()> {
/// let descriptor = DatasetId::SchoolTerms.descriptor();
/// let pipeline = Pipeline::new(
///     descriptor.id.as_str(),
///     EndpointExtractor::new(ctx.isams(), descriptor, ctx.page_size()),
///     for_dataset(descriptor.id),
///     WarehouseLoader::new(ctx.warehouse(), ctx.table_for(descriptor), descriptor.schema),
/// );
/// let outcome = pipeline.run().await?;
/// println!("{} rows", outcome.rows());
/// # Ok(())
/// # }
/// ```
pub struct Pipeline<E, T, L> {
    name: String,
    extractor: E,
    transformer: T,
    loader: L,
}

impl<E, T, L> Pipeline<E, T, L>
where
    E: Extractor,
    T: Transformer<Input = E::Item>,
    L: Loader<Item = T::Output>,
{
    /// Create a new pipeline; `name` labels its log lines
    pub fn new(name: impl Into<String>, extractor: E, transformer: T, loader: L) -> Self {
        Self {
            name: name.into(),
            extractor,
            transformer,
            loader,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the pipeline to completion
    ///
    /// # Errors
    /// The first failing extract, transform or load aborts the run. Pages
    /// already loaded stay in the destination.
    pub async fn run(&self) -> Result<RunOutcome> {
        log::info!("Starting pipeline for {}", self.name.bright_white());
        match self.extractor.pagination() {
            Pagination::Single => self.run_single().await,
            Pagination::Multi { page_size } => self.run_paged(page_size).await,
        }
    }

    async fn run_single(&self) -> Result<RunOutcome> {
        let items = self
            .extractor
            .extract(None)
            .await
            .wrap_err_with(|| format!("Failed to extract {}", self.name))?;
        let total = items.len() as u64;
        log::debug!("Extracted {} item(s) for {}", total, self.name);

        let transformed = self.transformer.transform_many(items)?;
        let rows = self
            .loader
            .load(transformed, WriteMode::Truncate)
            .await
            .wrap_err_with(|| format!("Failed to load {}", self.name))?;

        log::info!("Loaded {} row(s) for {}", rows, self.name);
        Ok(RunOutcome::Loaded {
            rows,
            pages: 1,
            progress: Progress::new(total, total),
        })
    }

    async fn run_paged(&self, page_size: u32) -> Result<RunOutcome> {
        let totals = self
            .extractor
            .probe()
            .await
            .wrap_err_with(|| format!("Failed to probe {}", self.name))?;

        if totals.is_empty() {
            log::warn!(
                "{} returned no data (totalCount = {}, totalPages = {})",
                self.name,
                totals.total_count,
                totals.total_pages
            );
            return Ok(RunOutcome::Empty { totals });
        }

        let mut cursor = PageCursor::new(page_size, totals);
        let mut latch = TruncateOnce::new();
        let mut rows = 0;
        let mut pages = 0;

        loop {
            let progress = cursor.progress();
            log::info!("{}", format!("Processing {}", progress).yellow());

            let items = self
                .extractor
                .extract(Some(cursor.request()))
                .await
                .wrap_err_with(|| format!("Failed to extract page {} of {}", cursor.page(), self.name))?;
            let transformed = self.transformer.transform_many(items)?;
            rows += self
                .loader
                .load(transformed, latch.mode())
                .await
                .wrap_err_with(|| format!("Failed to load page {} of {}", cursor.page(), self.name))?;
            latch.record_write();
            pages += 1;

            log::info!("{}", format!("Processed {} for {}", progress, self.name).cyan());

            if !cursor.advance() {
                return Ok(RunOutcome::Loaded {
                    rows,
                    pages,
                    progress,
                });
            }
        }
    }
}
