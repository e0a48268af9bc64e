use clap::{Args, Parser, Subcommand};
use fanowire::cli::{
    decode_file, default_envelope_path, encode_file, format_summary, send_file, show_info,
    show_stats, EncodeOptions,
};
use fanowire::pipeline::{OrthogonalCodec, DEFAULT_BLOCK_BITS, DEFAULT_PAD_BLOCK};
use fanowire::sender::SenderOptions;
use fanowire::server::{self, DEFAULT_HOST, DEFAULT_PORT};
use fanowire::transport::{
    HttpTransport, LoopbackTransport, DEFAULT_SERVER_URL, DEFAULT_TIMEOUT_SECS,
};
use fanowire::{DecodeResponse, Result};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::Level;

/// Version info from build.rs
const VERSION: &str = env!("FANOWIRE_VERSION");
const BUILD: &str = env!("FANOWIRE_BUILD");
const PROFILE: &str = env!("FANOWIRE_PROFILE");
const GIT_HASH: &str = env!("FANOWIRE_GIT_HASH");

fn get_version() -> &'static str {
    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();
    VERSION_STRING.get_or_init(|| {
        format!("{} {} build {} ({})", PROFILE, VERSION, BUILD, GIT_HASH)
    })
}

#[derive(Parser)]
#[command(name = "fanowire")]
#[command(author, about = "Shannon-Fano compression over a Hadamard error-correcting channel", long_about = None)]
struct Cli {
    /// Print version
    #[arg(short = 'V', long)]
    version: bool,

    /// Log verbosity on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Flags shared by every command that builds an envelope
#[derive(Args)]
struct SenderArgs {
    /// Percentage of encoded bits to flip (0-100)
    #[arg(long = "errors", default_value = "0")]
    error_percentage: f64,

    /// Seed for the simulated channel
    #[arg(long)]
    seed: Option<u64>,

    /// Payload bits per Hadamard block
    #[arg(long, default_value_t = DEFAULT_BLOCK_BITS)]
    block_bits: usize,

    /// Byte block size for padding the compressed stream
    #[arg(long, default_value_t = DEFAULT_PAD_BLOCK)]
    pad_block: usize,

    /// Accept any file, not only images
    #[arg(long)]
    any_type: bool,
}

impl SenderArgs {
    fn into_options(self) -> EncodeOptions {
        EncodeOptions {
            sender: SenderOptions {
                block_bits: self.block_bits,
                pad_block_size: self.pad_block,
                error_percentage: self.error_percentage,
                seed: self.seed,
            },
            any_type: self.any_type,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a file into an envelope
    #[command(alias = "e")]
    Encode {
        /// Input file
        input: PathBuf,

        /// Output envelope (defaults to <input>.envelope.json)
        output: Option<PathBuf>,

        #[command(flatten)]
        sender: SenderArgs,
    },

    /// Decode an envelope and print the receiver report
    #[command(alias = "d")]
    Decode {
        /// Envelope file
        envelope: PathBuf,

        /// Write the recovered bytes here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Encode a file and post it to a receiver over HTTP
    Send {
        /// Input file
        input: PathBuf,

        /// Receiver base URL
        #[arg(long, default_value = DEFAULT_SERVER_URL)]
        url: String,

        /// Request timeout in seconds
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout: u64,

        #[command(flatten)]
        sender: SenderArgs,
    },

    /// Run the receiver: POST /decode, GET /health, GET /
    Serve {
        /// Address to bind
        #[arg(long, default_value = DEFAULT_HOST)]
        host: String,

        /// Port to listen on
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Payload bits per Hadamard block the receiver decodes
        #[arg(long, default_value_t = DEFAULT_BLOCK_BITS)]
        block_bits: usize,
    },

    /// Encode and decode a file in process
    #[command(alias = "r")]
    Run {
        /// Input file
        input: PathBuf,

        #[command(flatten)]
        sender: SenderArgs,
    },

    /// Show information about an envelope
    #[command(alias = "i")]
    Info {
        /// Envelope file
        envelope: PathBuf,
    },

    /// Coding statistics for a file
    #[command(alias = "s")]
    Stats {
        /// File to analyze
        file: PathBuf,

        /// Payload bits per Hadamard block
        #[arg(long, default_value_t = DEFAULT_BLOCK_BITS)]
        block_bits: usize,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Print a round-trip summary; a failed decode is an unsuccessful run
fn report_round_trip(summary: String, response: &DecodeResponse) -> Result<bool> {
    print!("{}", summary);
    if response.is_success() {
        println!("\n---PROCESSING COMPLETED SUCCESSFULLY---");
    } else {
        println!("\n---PROCESSING FAILED---");
    }
    Ok(response.is_success())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.version {
        println!("fanowire {}", get_version());
        return ExitCode::SUCCESS;
    }

    init_logging(cli.verbose);

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            use clap::CommandFactory;
            if let Err(e) = Cli::command().print_help() {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
            println!();
            return ExitCode::SUCCESS;
        }
    };

    let result: Result<bool> = match command {
        Commands::Encode {
            input,
            output,
            sender,
        } => {
            let output = output.unwrap_or_else(|| default_envelope_path(&input));
            encode_file(&input, &output, &sender.into_options()).map(|envelope| {
                println!(
                    "Encoded {} into {} ({} errors injected)",
                    input.display(),
                    output.display(),
                    envelope.errors
                );
                true
            })
        }

        Commands::Decode { envelope, output } => {
            decode_file(&envelope, output.as_deref()).and_then(|response| {
                println!("{}", String::from_utf8_lossy(&response.to_json()?));
                Ok(response.is_success())
            })
        }

        Commands::Send {
            input,
            url,
            timeout,
            sender,
        } => {
            let transport = HttpTransport::new(&url, Duration::from_secs(timeout));
            send_file(&input, &transport, &sender.into_options()).and_then(
                |(envelope, response)| {
                    report_round_trip(format_summary(&envelope, &response), &response)
                },
            )
        }

        Commands::Serve {
            host,
            port,
            block_bits,
        } => OrthogonalCodec::new(block_bits).and_then(|codec| {
            println!("Starting server on {}:{}", host, port);
            server::run(&host, port, codec).map(|_| true)
        }),

        Commands::Run { input, sender } => {
            let options = sender.into_options();
            options
                .sender
                .codec()
                .and_then(|codec| send_file(&input, &LoopbackTransport::new(codec), &options))
                .and_then(|(envelope, response)| {
                    report_round_trip(format_summary(&envelope, &response), &response)
                })
        }

        Commands::Info { envelope } => show_info(&envelope).map(|info| {
            print!("{}", info);
            true
        }),

        Commands::Stats { file, block_bits } => OrthogonalCodec::new(block_bits)
            .and_then(|codec| show_stats(&file, &codec))
            .map(|stats| {
                print!("{}", stats);
                true
            }),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
