//! Paperwire CLI - Move file trees through paper and printable text
//!
//! Usage:
//!   paperwire pack <path>... -o codes/       Files to QR code images
//!   paperwire unpack <dir>... -o out/        QR code images to files
//!   paperwire seal <file>... > frames.txt    Files to encrypted text
//!   paperwire open < frames.txt              Encrypted text to files

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use paperwire_cli::{open, pack, seal, unpack};
use paperwire_core::EcLevel;

#[derive(Parser)]
#[command(name = "paperwire")]
#[command(about = "File trees over QR stacks and printable text", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack files into a folder of QR code images
    Pack {
        /// Files or glob patterns to pack
        #[arg(required = true)]
        path: Vec<String>,

        /// Error correction level (L, M, Q or H)
        #[arg(short, long, default_value = "M")]
        error: EcLevel,

        /// Largest symbol version used for chunk capacity
        #[arg(long, default_value_t = 40, value_parser = clap::value_parser!(u8).range(1..=40))]
        max_version: u8,

        /// Directory to hold the QR code files
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Rebuild a file tree from folders of QR code images
    Unpack {
        /// Directories holding scanned code images
        #[arg(required = true)]
        path: Vec<PathBuf>,

        /// Directory to extract into
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Treat inputs as text dumps, keeping only their digits
        #[arg(long)]
        raw: bool,
    },

    /// Encrypt files into printable text frames on stdout
    Seal {
        /// Files to seal
        #[arg(required = true)]
        path: Vec<PathBuf>,

        /// Read the password from the first line of this file
        #[arg(long)]
        password_file: Option<PathBuf>,
    },

    /// Decrypt text frames from stdin into numbered files
    Open {
        /// Directory to write the decrypted files
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Read the password from the first line of this file
        #[arg(long)]
        password_file: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging; frame and file data go to stdout, logs to stderr
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Pack {
            path,
            error,
            max_version,
            output,
        } => pack::run(pack::PackConfig {
            patterns: path,
            level: error,
            max_version,
            output_dir: output,
        }),
        Commands::Unpack { path, output, raw } => unpack::run(unpack::UnpackConfig {
            sources: path,
            output_dir: output,
            raw,
        }),
        Commands::Seal {
            path,
            password_file,
        } => seal::run(seal::SealConfig {
            paths: path,
            password_file,
        }),
        Commands::Open {
            output,
            password_file,
        } => open::run(open::OpenConfig {
            output_dir: output,
            password_file,
        }),
    }
}
