//! powder CLI - passphrase-protected text envelopes
//!
//! Command-line interface for encrypting and decrypting text files using
//! AES-256-GCM with PBKDF2-HMAC-SHA256 key derivation.

use clap::{Parser, Subcommand};
use std::error::Error as StdError;
use std::path::PathBuf;
use std::process;

use powder::FormatVersion;
use powder::file_ops;
use powder::passphrase::{PassphraseSource, StreamPassphrase, TerminalPrompt};

#[derive(Parser)]
#[command(name = "powder")]
#[command(version)]
#[command(about = "Passphrase-protected text envelopes.", long_about = None)]
struct Cli {
    /// Read passphrase from stdin instead of from terminal
    #[arg(long, global = true)]
    passphrase_stdin: bool,

    /// Log what is being done to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a text file
    #[command(alias = "e")]
    Encrypt {
        /// Path to the file whose contents is to be encrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the file to write the encrypted blob to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Write format version 1 (100 PBKDF2 rounds), readable by older
        /// consumers such as the editor extension
        #[arg(long)]
        legacy: bool,
    },

    /// Decrypt a file
    #[command(alias = "d")]
    Decrypt {
        /// Path to the file whose contents is to be decrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the file to write the unencrypted text to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Update an encrypted file with new content, while validating
    /// that the passphrase is not accidentally changed.
    #[command(alias = "u")]
    Update {
        /// Path to the file whose contents is to be encrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the existing powder file to replace with encrypted text
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Report whether a file holds a powder envelope, without decrypting it
    #[command(alias = "c")]
    Check {
        /// Path to the file to inspect
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Encrypt {
            input,
            output,
            legacy,
        } => {
            let version = if legacy {
                FormatVersion::V1
            } else {
                FormatVersion::CURRENT
            };
            let mut source = get_passphrase_source(cli.passphrase_stdin);
            file_ops::encrypt_file(&input, &output, &mut *source, version)
        }
        Commands::Decrypt { input, output } => {
            let mut source = get_passphrase_source(cli.passphrase_stdin);
            file_ops::decrypt_file(&input, &output, &mut *source)
        }
        Commands::Update { input, output } => {
            let mut source = get_passphrase_source(cli.passphrase_stdin);
            file_ops::update_file(&input, &output, &mut *source)
        }
        Commands::Check { input } => file_ops::check_file(&input).map(|version| match version {
            Some(version) => println!("encrypted (format {})", version),
            None => println!("not encrypted"),
        }),
    };

    if let Err(e) = result {
        let mut message = e.to_string();
        let mut source = e.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        eprintln!("Error: {}", message);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn get_passphrase_source(use_stdin: bool) -> Box<dyn PassphraseSource> {
    if use_stdin {
        Box::new(StreamPassphrase::new(std::io::stdin()))
    } else {
        Box::new(TerminalPrompt::default())
    }
}
