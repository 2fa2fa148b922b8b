use crate::cli::args::{Cli, Commands, OutputFormat};
use crate::config::Settings;
use crate::error::Result;
use crate::models::{MonthlyTable, TopicKey};
use crate::processors::{Aggregator, IntegrityChecker};
use crate::readers::StoreReader;
use crate::utils::progress::ProgressReporter;
use crate::writers::StoreWriter;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub async fn run(cli: Cli) -> Result<()> {
    setup_logging(cli.verbose, cli.log_file.as_deref())?;

    let mut settings = Settings::load(cli.config.as_deref())?;
    debug!(?settings, "Settings loaded");

    match cli.command {
        Commands::Build {
            input_dir,
            store,
            max_workers,
            separator,
            encoding,
            compression,
            mmap,
            fail_fast,
        } => {
            if let Some(store) = store {
                settings.store_path = store;
            }
            if let Some(max_workers) = max_workers {
                settings.max_workers = max_workers;
            }
            if let Some(separator) = separator {
                settings.separator = separator;
            }
            if let Some(encoding) = encoding {
                settings.encoding = encoding;
            }
            if let Some(compression) = compression {
                settings.compression = compression;
            }
            settings.use_mmap |= mmap;
            settings.validate()?;

            build_store(input_dir, settings, fail_fast, cli.quiet).await?;
        }

        Commands::Query {
            topic,
            store,
            format,
            output,
            limit,
        } => {
            let store = store.unwrap_or(settings.store_path);
            let reader = StoreReader::open(&store)?;
            let table = reader.load(&topic)?;
            let table = match limit {
                Some(limit) => table.head(limit),
                None => table,
            };

            match output {
                Some(path) => {
                    let mut writer = BufWriter::new(File::create(&path)?);
                    write_table(&table, format, &mut writer)?;
                    writer.flush()?;
                    info!(path = %path.display(), rows = table.num_rows(), "Table written");
                }
                None => {
                    let stdout = io::stdout();
                    let mut handle = stdout.lock();
                    write_table(&table, format, &mut handle)?;
                }
            }
        }

        Commands::Info { store } => {
            let store = store.unwrap_or(settings.store_path);
            let reader = StoreReader::open(&store)?;

            println!("Store: {}", store.display());
            match reader.manifest()? {
                Some(manifest) => println!("{}", manifest.summary()),
                None => println!("No manifest found"),
            }

            println!("Topics present:");
            for topic in TopicKey::ALL {
                let status = if reader.contains(topic) {
                    "present"
                } else {
                    "missing"
                };
                println!("  {:<10} {:<8} {}", topic.as_str(), status, topic.description());
            }
        }

        Commands::Topics => {
            println!("{:<10} {:<30} Description", "Key", "Section label");
            for topic in TopicKey::ALL {
                println!(
                    "{:<10} {:<30} {}",
                    topic.as_str(),
                    topic.label(),
                    topic.description()
                );
            }
        }
    }

    Ok(())
}

async fn build_store(
    input_dir: PathBuf,
    settings: Settings,
    fail_fast: bool,
    quiet: bool,
) -> Result<()> {
    println!("Building topic store...");
    println!("Input directory: {}", input_dir.display());
    println!("Store: {}", settings.store_path.display());
    println!(
        "Workers: {}, Separator: {:?}, Encoding: {}",
        settings.max_workers, settings.separator, settings.encoding
    );

    let reader = settings.report_reader()?;
    let aggregator = Aggregator::new(settings.max_workers)
        .with_reader(reader)
        .with_fail_fast(fail_fast);

    let data = tokio::task::spawn_blocking(move || {
        let progress = ProgressReporter::new_spinner("Scanning report directory...", quiet);
        let result = aggregator.aggregate_directory(&input_dir, Some(&progress));
        progress.finish_with_message("Parsing complete");
        result
    })
    .await??;

    for failure in &data.failures {
        println!("⚠️  Skipped {}: {}", failure.path.display(), failure.reason);
    }

    let checker = IntegrityChecker::new();
    let integrity_report = checker.check_integrity(&data);
    println!("\n{}", checker.generate_summary(&integrity_report));

    let mut writer =
        StoreWriter::create(&settings.store_path)?.with_compression(&settings.compression)?;
    for topic in TopicKey::ALL {
        writer.write_dataset(topic, data.records(topic))?;
    }
    let manifest = writer.finish(data.stations.len())?;

    println!("{}", data.summary());
    println!("\n{}", manifest.summary());
    println!("Store written to {}", settings.store_path.display());

    Ok(())
}

fn write_table<W: Write>(table: &MonthlyTable, format: OutputFormat, writer: &mut W) -> Result<()> {
    match format {
        OutputFormat::Table => {
            writeln!(writer, "{}", table.render())?;
            writeln!(
                writer,
                "\n{} rows, {} stations ({})",
                table.num_rows(),
                table.stations().len(),
                table.topic.description()
            )?;
        }
        OutputFormat::Csv => table.write_csv(writer)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, &table.to_json_rows())?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

/// Initialise tracing: RUST_LOG wins, else info (debug when verbose)
fn setup_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let log_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("smn_processor={}", log_level)));

    let result = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(std::sync::Mutex::new(file)),
                )
                .try_init()
        }
        None => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(io::stderr),
            )
            .try_init(),
    };

    if result.is_err() {
        debug!("Tracing subscriber already initialised");
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}
