use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use transit_router::{AppError, make_base, process_requests, read_document};

#[derive(Parser)]
#[command(version, about = "Bus network router")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the catalogue and the router and save them to the base file
    MakeBase {
        /// Request document, stdin if omitted
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Answer stat requests from a previously built base file
    ProcessRequests {
        /// Request document, stdin if omitted
        #[arg(long)]
        input: Option<PathBuf>,
        /// Responses file, stdout if omitted
        #[arg(long)]
        output: Option<PathBuf>,
        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,
    },
}

fn open_input(path: Option<&PathBuf>) -> Result<Box<dyn Read>, AppError> {
    Ok(match path {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    })
}

fn open_output(path: Option<&PathBuf>) -> Result<Box<dyn Write>, AppError> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    })
}

fn run(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Command::MakeBase { input } => {
            let document = read_document(open_input(input.as_ref())?)?;
            let path = make_base(&document)?;
            info!("Base saved to {}", path.display());
        }
        Command::ProcessRequests {
            input,
            output,
            pretty,
        } => {
            let document = read_document(open_input(input.as_ref())?)?;
            let mut writer = open_output(output.as_ref())?;
            process_requests(&document, &mut writer, pretty)?;
            writer.flush()?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
