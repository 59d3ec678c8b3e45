use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "sat_parser")]
#[command(about = "Convert SAT test documents into structured CSV files")]
#[command(version)]
pub struct Cli {
    /// RON config file (defaults to ./sat_parser.ron when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Upload documents, track processing, and export the results as CSV
    Process(ProcessArgs),
    /// Print the question schema and sample rows
    Schema,
}

#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Documents to process (PDF, DOC, DOCX, TXT)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Directory for exported CSV files
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Maximum number of documents processed at once
    #[arg(long)]
    pub max_concurrent: Option<usize>,

    /// Skip the CSV export once processing finishes
    #[arg(long)]
    pub no_export: bool,

    /// Print a table preview of each completed document
    #[arg(long)]
    pub preview: bool,
}
