use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "caserun", about = "Test-case runner support utilities", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run one command with captured output and a wall-clock timeout.
    Run {
        /// Directory the command runs in.
        #[arg(long = "working-dir", default_value = ".")]
        working_dir: PathBuf,

        /// Timeout in seconds; 0 disables the timeout entirely.
        #[arg(long, default_value_t = 5)]
        timeout: u64,

        /// The command and its arguments, after `--`.
        #[arg(last = true, required = true, value_name = "CMD")]
        command: Vec<String>,
    },

    /// Sample function records from a case archive into functions.yaml.
    Batch {
        /// Zip archive holding func_<N>.yaml entries.
        #[arg(long)]
        zip: PathBuf,

        /// How many records to sample.
        #[arg(long)]
        count: usize,

        /// Total number of records in the archive.
        #[arg(long)]
        total: usize,

        /// Where functions.yaml is written.
        #[arg(long = "output-dir", default_value = ".")]
        output_dir: PathBuf,
    },

    /// Delete files in a directory whose names contain a substring.
    Clean {
        /// Directory to clean.
        directory: PathBuf,

        /// Substring matched against file names.
        substring: String,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
