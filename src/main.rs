use clap::{Parser, Subcommand, builder::styling};
use eyre::Result;
use isams_etl::cli::{self, DriveDestination, RunSelection};
use isams_etl::settings::Settings;
use isams_etl::storage::{DriveTarget, UploadOutcome};
use owo_colors::OwoColorize;
use std::path::PathBuf;

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// iSAMS ETL: pulls school-management datasets into the data warehouse
#[derive(Parser)]
#[command(name = "isams-etl", version, styles = STYLES)]
struct Cli {
    /// The dotenv file to source settings from (skipped if missing)
    #[arg(short, long, global = true, default_value = ".env")]
    env: String,

    /// More verbose logging
    #[arg(long, global = true)]
    debug: bool,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract every dataset from iSAMS and load it into the warehouse
    Run {
        /// Only run these datasets (repeatable)
        #[arg(short, long = "dataset", value_name = "NAME")]
        datasets: Vec<String>,

        /// Only run datasets whose name matches this regex
        #[arg(long)]
        include: Option<String>,

        /// Skip datasets whose name matches this regex
        #[arg(long)]
        exclude: Option<String>,

        /// Don't run the year-group divisions pipeline afterwards
        #[arg(long)]
        skip_custom: bool,
    },

    /// Load year-group divisions only
    Divisions,

    /// Test authorization to iSAMS
    Auth,

    /// List the registry datasets
    Datasets,

    /// Upload a local file to a Cloud Storage bucket
    Upload {
        /// File to upload (.csv, .txt, .xlsx or .log)
        file: PathBuf,

        /// Destination bucket
        #[arg(short, long)]
        bucket: String,

        /// Path inside the bucket to place the file under
        #[arg(short, long)]
        prefix: Option<String>,

        /// 'i' to skip existing objects, 't' to overwrite them
        #[arg(short, long, default_value = "i")]
        mode: String,
    },

    /// Load a bucket file into a warehouse table
    BucketLoad {
        /// `bucket/path/to/file.csv`, without `gs://`
        bucket_path: String,

        /// `project.dataset.table`, or a table name under WAREHOUSE_DATASET
        #[arg(short, long)]
        table: String,

        /// 'a' to append, 't' to truncate
        #[arg(short, long, default_value = "t")]
        mode: String,

        /// Source format: csv or json
        #[arg(short, long, default_value = "csv")]
        format: String,
    },

    /// Upload a local file to Google Drive
    DriveUpload {
        /// File to upload (.csv, .txt, .xlsx or .log)
        file: PathBuf,

        /// Shared drive id, or 'my-drive' for a personal drive
        #[arg(long, default_value = "my-drive")]
        drive: String,

        /// Destination folder id (defaults to the drive root)
        #[arg(long)]
        folder_id: Option<String>,

        /// Find this folder by name under the destination folder
        #[arg(long)]
        folder: Option<String>,

        /// Create the named folder when it doesn't exist
        #[arg(long, requires = "folder")]
        create_folder: bool,

        /// Always create a new file instead of updating a same-named one
        #[arg(long)]
        keep_duplicates: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let dotenv = dotenvy::from_filename(&cli.env);

    let log_level = match cli.debug {
        true => "debug",
        false => "info",
    };
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();

    match dotenv {
        Ok(path) => log::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => log::debug!("No env file at {}", cli.env),
        Err(e) => return Err(e.into()),
    }

    match cli.command {
        Commands::Run {
            datasets,
            include,
            exclude,
            skip_custom,
        } => {
            let selection = RunSelection {
                datasets,
                include,
                exclude,
                skip_custom,
            };
            let settings = Settings::from_env()?;
            let reports = cli::run_job(&settings, &selection).await?;
            cli::print_summary(&reports);
        }
        Commands::Divisions => {
            let settings = Settings::from_env()?;
            let report = cli::run_divisions_job(&settings).await?;
            cli::print_summary(std::slice::from_ref(&report));
        }
        Commands::Auth => {
            log::info!("Testing authorization");
            let settings = Settings::from_env()?;
            let url = cli::check_auth(&settings).await?;
            log::info!(
                "{} {}",
                "Authorized against".green(),
                url.as_str().bright_black()
            );
        }
        Commands::Datasets => {
            let destination = Settings::warehouse_from_env()?;
            for line in cli::dataset_lines(destination.as_ref()) {
                println!("{}", line);
            }
        }
        Commands::Upload {
            file,
            bucket,
            prefix,
            mode,
        } => {
            log::info!(
                "Uploading {} to bucket {}",
                file.display().bright_black(),
                bucket.cyan()
            );
            let settings = Settings::from_env()?;
            match cli::upload_to_bucket(&settings, &file, &bucket, prefix.as_deref(), &mode).await? {
                UploadOutcome::Uploaded { object } => {
                    log::info!("{} gs://{}/{}", "Uploaded".green(), bucket, object)
                }
                UploadOutcome::Skipped { object } => {
                    log::info!("{} gs://{}/{} already exists", "Skipped".yellow(), bucket, object)
                }
            }
        }
        Commands::BucketLoad {
            bucket_path,
            table,
            mode,
            format,
        } => {
            log::info!(
                "Loading gs://{} into {} ({})",
                bucket_path.bright_black(),
                table.cyan(),
                mode
            );
            let settings = Settings::from_env()?;
            let job = cli::load_bucket_file(&settings, &bucket_path, &table, &mode, &format).await?;
            log::info!(
                "{} job {}",
                "Load complete:".green(),
                job.job_reference.job_id
            );
        }
        Commands::DriveUpload {
            file,
            drive,
            folder_id,
            folder,
            create_folder,
            keep_duplicates,
        } => {
            let destination = DriveDestination {
                target: DriveTarget::new(drive != "my-drive", &drive)?,
                folder_id,
                folder_name: folder,
                create_folder,
            };
            log::info!("Uploading {} to Drive", file.display().bright_black());
            let settings = Settings::from_env()?;
            let upload = cli::upload_to_drive(&settings, &file, &destination, !keep_duplicates).await?;
            log::info!(
                "{} {} ({})",
                match upload {
                    isams_etl::storage::DriveUpload::Created(_) => "Created",
                    isams_etl::storage::DriveUpload::Updated(_) => "Updated",
                }
                .green(),
                upload.file().name,
                upload.file().id.bright_black()
            );
        }
    }

    Ok(())
}
