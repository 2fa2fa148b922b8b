use crate::utils::constants::DEFAULT_RAW_DATA_DIR;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "smn-processor")]
#[command(about = "Monthly climatology processor for SMN station reports")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Suppress progress output")]
    pub quiet: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Settings file [default: smn.toml if present]"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a directory of station reports and write a fresh topic store
    Build {
        #[arg(
            short,
            long,
            default_value = DEFAULT_RAW_DATA_DIR,
            help = "Directory with one report file per station"
        )]
        input_dir: PathBuf,

        #[arg(short, long, help = "Store directory [default: meteodata]")]
        store: Option<PathBuf>,

        #[arg(long, help = "Worker threads for report parsing [default: CPU count]")]
        max_workers: Option<usize>,

        #[arg(long, help = "Field separator [default: tab]")]
        separator: Option<char>,

        #[arg(long, help = "Report text encoding label [default: utf-8]")]
        encoding: Option<String>,

        #[arg(short, long, help = "Parquet compression [default: snappy]")]
        compression: Option<String>,

        #[arg(long, help = "Read reports through memory maps")]
        mmap: bool,

        #[arg(long, help = "Abort on the first unreadable report")]
        fail_fast: bool,
    },

    /// Load one topic from the store as a table
    Query {
        #[arg(short, long, help = "Topic key (pmax24, p, evo, tmax_x, tmax_mean, tmin_x, tmin_mean, t)")]
        topic: String,

        #[arg(short, long, help = "Store directory [default: meteodata]")]
        store: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        #[arg(short, long, help = "Write output to a file instead of stdout")]
        output: Option<PathBuf>,

        #[arg(short, long, help = "Maximum rows to output")]
        limit: Option<usize>,
    },

    /// Display store manifest and per-topic row counts
    Info {
        #[arg(short, long, help = "Store directory [default: meteodata]")]
        store: Option<PathBuf>,
    },

    /// List section labels and their topic keys
    Topics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
}
