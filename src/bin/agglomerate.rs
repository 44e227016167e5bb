use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use chrono::Local;
use clap::Parser;
use log::{info, warn, error, LevelFilter};
use env_logger::Builder;
use agglom::{
    AgglomConfig,
    AttributeTable,
    CorrelationMatrix,
    CorrelationSummary,
    CsvLoader,
    Error,
    MergeEngine,
    config::subsystems::cluster::RebuildStrategy,
    report::{self, ConsoleObserver, RunSummary},
};

/// Correlation analysis and prototype-based agglomerative clustering of a CSV table.
///
/// The first column of the input is a row identifier; every other column
/// must be numeric. Clustering is cubic in the number of rows, so use
/// --limit on large files.
#[derive(Debug, Parser)]
#[command(name = "agglomerate", version)]
struct Args {
    /// CSV file to analyse
    path: PathBuf,

    /// Cluster only the first N rows
    #[arg(short, long, value_name = "N")]
    limit: Option<usize>,

    /// INI configuration file (defaults to agglom.ini when present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory for linkage.csv and summary.json
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Build distance matrices on a rayon thread pool
    #[arg(long)]
    parallel: bool,

    /// Worker threads for --parallel (0 = one per CPU)
    #[arg(long, value_name = "N")]
    threads: Option<usize>,

    /// Distance matrix update after each merge: full or incremental
    #[arg(long, value_name = "STRATEGY", value_parser = parse_rebuild)]
    rebuild: Option<RebuildStrategy>,

    /// none, error, warn, info, debug or trace
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Skip the correlation report
    #[arg(long)]
    skip_correlation: bool,

    /// Hide the distance matrix progress bar
    #[arg(long)]
    no_progress: bool,
}

fn parse_rebuild(value: &str) -> Result<RebuildStrategy, String> {
    RebuildStrategy::from_str(value)
        .ok_or_else(|| format!("invalid rebuild strategy '{}' (expected full or incremental)", value))
}

impl Args {
    fn load_config(&self) -> agglom::Result<AgglomConfig> {
        let mut config = match &self.config {
            Some(path) => AgglomConfig::from_ini(path)?,
            None if Path::new("agglom.ini").exists() => AgglomConfig::from_ini("agglom.ini")?,
            None => AgglomConfig::default(),
        };

        if let Some(limit) = self.limit {
            config.loader.row_limit = Some(limit);
        }
        if let Some(dir) = &self.output_dir {
            config.files.output_dir = dir.clone();
        }
        if self.parallel {
            config.cluster.parallel = true;
        }
        if let Some(threads) = self.threads {
            config.cluster.thread_count = threads;
        }
        if let Some(rebuild) = self.rebuild {
            config.cluster.rebuild = rebuild;
        }
        if let Some(level) = &self.log_level {
            config.report.set_log_level(level)?;
        }
        if self.skip_correlation {
            config.correlation.enabled = false;
        }
        if self.no_progress {
            config.report.show_progress = false;
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_logging(config: &AgglomConfig) -> agglom::Result<LevelFilter> {
    let log_level = config.report.get_log_level();
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.files.log_dir.join(format!("agglomerate_{}.log", timestamp)))?;

    Builder::new()
        .format(|buf, record| {
            writeln!(buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, log_level)
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    Ok(log_level)
}

fn correlation_report(table: &agglom::Table, config: &AgglomConfig) -> CorrelationSummary {
    let matrix = CorrelationMatrix::compute(table).rounded(config.correlation.decimals);
    println!("{:.*}", config.correlation.decimals as usize, matrix);
    println!();

    let summary = CorrelationSummary::from_matrix(&matrix, config.correlation.irrelevance_threshold);
    print!("{}", summary);
    summary
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return Err(e.into());
        }
    };

    config.files.ensure_directories()?;
    let log_level = init_logging(&config)?;
    if log_level != LevelFilter::Off {
        info!("Starting agglomeration of {:?} with log level: {:?}", args.path, log_level);
    }

    let loader = CsvLoader::new(&config.loader);
    let table = match loader.load_path(&args.path) {
        Ok(table) => table,
        Err(Error::Io(e)) => {
            error!("Failed to open {:?}: {}", args.path, e);
            eprintln!("{} does not exist", args.path.display());
            return Err(e.into());
        }
        Err(e) => {
            error!("Failed to load {:?}: {}", args.path, e);
            eprintln!("Could not load {}: {}", args.path.display(), e);
            return Err(e.into());
        }
    };

    let correlation = if config.correlation.enabled {
        if table.column_count() < 2 {
            warn!("Only one attribute column; correlation report skipped");
            None
        } else {
            Some(correlation_report(&table, &config))
        }
    } else {
        None
    };

    let clustered = match config.loader.row_limit {
        Some(limit) => table.head(limit),
        None => table.clone(),
    };
    info!(
        "Clustering {} of {} rows ({} attributes)",
        clustered.row_count(),
        table.row_count(),
        clustered.column_count()
    );

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        ctrlc::set_handler(move || {
            cancel.store(true, Ordering::Relaxed);
        })?;
    }

    let start = Instant::now();
    let mut observer = ConsoleObserver::new(config.report.show_progress);
    let outcome = MergeEngine::new(&clustered, &config.cluster)?
        .with_cancel_flag(Arc::clone(&cancel))
        .run(&mut observer);
    observer.finish();

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(Error::Cancelled { merges }) => {
            warn!("Interrupted after {} merges", merges);
            eprintln!("Interrupted after {} merges; no report written", merges);
            return Err(Error::Cancelled { merges }.into());
        }
        Err(e) => return Err(e.into()),
    };
    info!("Clustering took {:.2?}", start.elapsed());

    print!("{}", report::final_report(&outcome));

    let summary = RunSummary::new(&args.path, table.row_count(), &outcome, correlation);
    for path in report::write_artifacts(&config, &summary, &outcome)? {
        println!("Wrote {}", path.display());
    }

    Ok(())
}
