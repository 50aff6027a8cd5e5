mod cli;

use std::time::Duration;

use anyhow::Result;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

use caserun::{batch, exec, utils};
use cli::Commands;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Cli::parse();

    match args.command {
        Commands::Run {
            working_dir,
            timeout,
            command,
        } => {
            // A zero timeout disables the limit.
            let limit = (timeout > 0).then(|| Duration::from_secs(timeout));
            let outcome = exec::run_cmd(&command, &working_dir, limit).await;
            let out = match outcome {
                Ok(out) => out,
                Err(err @ exec::ExecError::Timeout { .. }) => {
                    eprintln!("{}", err.red());
                    std::process::exit(124);
                }
                Err(err) => return Err(err.into()),
            };
            for line in &out.stdout {
                println!("{line}");
            }
            for line in &out.stderr {
                eprintln!("{}", line.red());
            }
            std::process::exit(out.exit_code);
        }
        Commands::Batch {
            zip,
            count,
            total,
            output_dir,
        } => {
            let path = batch::generate_function_batch(&zip, count, total, &output_dir)?;
            println!("wrote {}", path.display());
        }
        Commands::Clean {
            directory,
            substring,
        } => {
            let removed = utils::delete_files_with_substring(&directory, &substring)?;
            println!("removed {removed} file(s)");
        }
    }

    Ok(())
}
