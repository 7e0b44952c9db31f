//! CLI helper functions

use crate::{
    client::{GoogleClient, IsamsClient},
    etl::{Pipeline, RunOutcome},
    isams::{self, DIVISIONS, DatasetDescriptor, EndpointExtractor, YEAR_GROUP_IDS},
    job_context::{self, JobContext},
    settings::Settings,
    storage::{Bucket, Drive, DriveTarget, DriveUpload, FileType, UploadMode, UploadOutcome},
    transform::for_dataset,
    warehouse::{BigQuery, DatasetRef, Job, SourceFormat, TableId, WarehouseLoader, WriteMode},
};
use eyre::{Context, Result};
use owo_colors::OwoColorize;
use std::path::Path;
use url::Url;

/// Result of one dataset within a job
#[derive(Debug, Clone)]
pub struct DatasetReport {
    pub name: String,
    pub table: TableId,
    pub outcome: RunOutcome,
}

/// Which datasets a `run` covers
#[derive(Debug, Clone, Default)]
pub struct RunSelection {
    pub datasets: Vec<String>,
    pub include: Option<String>,
    pub exclude: Option<String>,
    pub skip_custom: bool,
}

impl RunSelection {
    /// Resolve names and patterns to registry entries
    ///
    /// Fails on unknown names or bad patterns before anything connects.
    pub fn resolve(&self) -> Result<Vec<&'static DatasetDescriptor>> {
        let selected = isams::select(&self.datasets)?;
        Ok(isams::filter(
            selected,
            self.include.as_deref(),
            self.exclude.as_deref(),
        )?)
    }
}

/// Run one registry dataset: extract every page, transform, load
pub async fn run_dataset(ctx: &JobContext, dataset: &'static DatasetDescriptor) -> Result<DatasetReport> {
    let table = ctx.table_for(dataset);
    let pipeline = Pipeline::new(
        dataset.id.as_str(),
        EndpointExtractor::new(ctx.isams(), dataset, ctx.page_size()),
        for_dataset(dataset.id),
        WarehouseLoader::new(ctx.warehouse(), table.clone(), dataset.schema),
    );

    let outcome = pipeline.run().await.with_context(|| {
        let resource = ctx
            .isams()
            .endpoint(dataset.path)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| dataset.path.to_string());
        format!("Error processing endpoint '{}'", resource)
    })?;

    Ok(DatasetReport {
        name: dataset.id.to_string(),
        table,
        outcome,
    })
}

/// Run the divisions custom pipeline
pub async fn run_divisions(ctx: &JobContext) -> Result<DatasetReport> {
    let table = ctx.table(DIVISIONS);
    let loader = WarehouseLoader::new(ctx.warehouse(), table.clone(), None);
    let outcome = isams::run_divisions(ctx.isams(), YEAR_GROUP_IDS, &loader)
        .await
        .context("Error processing year-group divisions")?;

    Ok(DatasetReport {
        name: DIVISIONS.to_string(),
        table,
        outcome,
    })
}

/// Run datasets in order, stopping at the first failure
pub async fn run_datasets(
    ctx: &JobContext,
    datasets: &[&'static DatasetDescriptor],
) -> Result<Vec<DatasetReport>> {
    let mut reports = Vec::with_capacity(datasets.len());
    for dataset in datasets {
        log::info!("{} {}", "Current endpoint:".blue(), dataset.id.bright_white());
        let report = run_dataset(ctx, dataset).await.inspect_err(|e| {
            log::error!("{}", format!("{:#}", e).red());
        })?;
        log_report(&report);
        reports.push(report);
    }
    Ok(reports)
}

fn log_report(report: &DatasetReport) {
    match report.outcome {
        RunOutcome::Loaded { rows, .. } => log::info!(
            "{}",
            format!("Endpoint: {} loaded successfully ({} rows)", report.name, rows).green()
        ),
        RunOutcome::Empty { .. } => log::warn!(
            "{}",
            format!("Endpoint: {} returned no data, {} left untouched", report.name, report.table)
                .yellow()
        ),
    }
}

/// The full scheduled job: selected registry datasets, then divisions
pub async fn run_job(settings: &Settings, selection: &RunSelection) -> Result<Vec<DatasetReport>> {
    let datasets = selection.resolve()?;
    log::info!(
        "Running {} dataset(s){}",
        datasets.len(),
        if selection.skip_custom { "" } else { " and divisions" }
    );

    let ctx = JobContext::connect(settings).await?;
    let mut reports = run_datasets(&ctx, &datasets).await?;

    if !selection.skip_custom {
        log::info!("{} {}", "Current endpoint:".blue(), DIVISIONS.bright_white());
        let report = run_divisions(&ctx).await.inspect_err(|e| {
            log::error!("{}", format!("{:#}", e).red());
        })?;
        log_report(&report);
        reports.push(report);
    }

    Ok(reports)
}

/// Run only the divisions pipeline
pub async fn run_divisions_job(settings: &Settings) -> Result<DatasetReport> {
    let ctx = JobContext::connect(settings).await?;
    let report = run_divisions(&ctx).await?;
    log_report(&report);
    Ok(report)
}

/// One line per dataset; empty datasets are marked EMPTY
pub fn summary_lines(reports: &[DatasetReport]) -> Vec<String> {
    reports
        .iter()
        .map(|report| match report.outcome {
            RunOutcome::Loaded { rows, pages, .. } => format!(
                "{:<16} {:>8} rows {:>4} page(s) -> {}",
                report.name, rows, pages, report.table
            ),
            RunOutcome::Empty { totals } => format!(
                "{:<16} EMPTY (totalCount = {}, totalPages = {}) -> {}",
                report.name, totals.total_count, totals.total_pages, report.table
            ),
        })
        .collect()
}

pub fn print_summary(reports: &[DatasetReport]) {
    println!("{}", "Summary".bright_white().bold());
    for (report, line) in reports.iter().zip(summary_lines(reports)) {
        if report.outcome.is_empty() {
            println!("  {}", line.yellow());
        } else {
            println!("  {}", line.green());
        }
    }
    let empty = reports.iter().filter(|r| r.outcome.is_empty()).count();
    if empty > 0 {
        println!(
            "{}",
            format!("{} dataset(s) returned no data", empty).yellow().bold()
        );
    }
}

/// Test authorization against iSAMS
pub async fn check_auth(settings: &Settings) -> Result<Url> {
    let google = job_context::google_client(settings)?;
    let credentials = job_context::resolve_credentials(settings, &google).await?;
    let client: IsamsClient = job_context::connect_isams(&credentials).await?;
    Ok(client.url().clone())
}

/// Lines describing every registry dataset
///
/// The destination is `<dataset>.<name>` when a warehouse dataset is known,
/// otherwise the bare table name.
pub fn dataset_lines(destination: Option<&DatasetRef>) -> Vec<String> {
    isams::REGISTRY
        .iter()
        .map(|d| {
            let table = match destination {
                Some(dest) => dest.table(d.table()).to_string(),
                None => d.table().to_string(),
            };
            format!(
                "{:<16} {:<6} {:<38} -> {}",
                d.id.as_str(),
                match d.pages {
                    isams::PageMode::Single => "single",
                    isams::PageMode::Multi => "multi",
                },
                d.path,
                table
            )
        })
        .collect()
}

fn google(settings: &Settings) -> Result<GoogleClient> {
    job_context::google_client(settings)
}

/// Upload a local file to a bucket
pub async fn upload_to_bucket(
    settings: &Settings,
    file: &Path,
    bucket: &str,
    prefix: Option<&str>,
    mode: &str,
) -> Result<UploadOutcome> {
    let mode: UploadMode = mode.parse()?;
    let bucket = Bucket::new(google(settings)?, bucket);
    Ok(bucket
        .upload_file(file, prefix, mode)
        .await
        .with_context(|| format!("Failed to upload {}", file.display()))?)
}

/// Load a bucket file into a warehouse table
pub async fn load_bucket_file(
    settings: &Settings,
    bucket_path: &str,
    table: &str,
    mode: &str,
    format: &str,
) -> Result<Job> {
    let mode: WriteMode = mode.parse()?;
    let format: SourceFormat = format.parse()?;
    let table: TableId = match table.parse() {
        Ok(id) => id,
        Err(_) => settings.require_warehouse()?.table(table),
    };

    let warehouse = BigQuery::new(google(settings)?, settings.project()?)
        .with_location(settings.location.clone());
    Ok(warehouse
        .load_from_bucket(bucket_path, &table, mode, format, None)
        .await?)
}

/// Where a drive upload lands
#[derive(Debug, Clone)]
pub struct DriveDestination {
    pub target: DriveTarget,
    /// Folder id; defaults to the drive root
    pub folder_id: Option<String>,
    /// Sub-folder name looked up (and optionally created) under the folder
    pub folder_name: Option<String>,
    pub create_folder: bool,
}

/// Upload a local file to a drive folder
pub async fn upload_to_drive(
    settings: &Settings,
    file: &Path,
    destination: &DriveDestination,
    update_duplicates: bool,
) -> Result<DriveUpload> {
    // validate before any request
    FileType::from_path(file)?;

    let drive = Drive::new(google(settings)?, destination.target.clone());
    let parent = destination
        .folder_id
        .clone()
        .unwrap_or_else(|| destination.target.drive_id().to_string());

    let folder_id = match &destination.folder_name {
        Some(name) => drive
            .find_folder(&parent, name, destination.create_folder)
            .await?
            .map(|folder| folder.id)
            .ok_or_else(|| eyre::eyre!("Folder '{}' not found in '{}'", name, parent))?,
        None => parent,
    };

    Ok(drive
        .upload_file(&folder_id, file, update_duplicates)
        .await
        .with_context(|| format!("Upload failed for {}", file.display()))?)
}
