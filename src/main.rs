use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use inovibe_frame::logging::log_warn;
use inovibe_frame::{init_logger, log_info, BatchConfig, BatchDecoder, FrameParser};

#[derive(Parser)]
#[command(name = "inovibe-frame")]
#[command(about = "Decode Ino-Vibe LoRa frames")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode one hex frame and print it as JSON
    Decode {
        hex: String,
        #[arg(long)]
        verify_checksum: bool,
        #[arg(short, long)]
        pretty: bool,
    },
    /// Decode a file with one hex frame per line
    Batch {
        file: PathBuf,
        #[arg(long)]
        verify_checksum: bool,
    },
    /// Print the raw header and payload fields as walked
    Fields { hex: String },
}

fn main() -> anyhow::Result<()> {
    init_logger();

    let cli = Cli::parse();

    match cli.command {
        Commands::Decode {
            hex,
            verify_checksum,
            pretty,
        } => {
            let parser = FrameParser::new(&hex).context("Invalid frame")?;
            if verify_checksum {
                parser.verify_checksum()?;
            }
            let frame = parser.decode_header()?;
            let payload = frame.payload().context("Payload decode failed")?;
            let decoded = inovibe_frame::DecodedFrame {
                header: frame.into_header(),
                payload,
            };

            let json = if pretty {
                serde_json::to_string_pretty(&decoded)?
            } else {
                serde_json::to_string(&decoded)?
            };
            println!("{json}");
        }
        Commands::Batch {
            file,
            verify_checksum,
        } => {
            let reader = File::open(&file)
                .map(BufReader::new)
                .with_context(|| format!("Cannot open {}", file.display()))?;

            let mut decoder = BatchDecoder::new(BatchConfig {
                verify_checksum,
                ..BatchConfig::default()
            });
            for frame in decoder.decode_reader(reader)? {
                println!("{}", serde_json::to_string(&frame)?);
            }

            let stats = decoder.stats();
            log_info(&format!(
                "Decoded {}/{} frames, {} failed {:?}",
                stats.decoded, stats.total, stats.failed, stats.failures
            ));

            let throttle = decoder.throttle_stats();
            if throttle.suppressed > 0 {
                log_warn(&format!(
                    "{} failure warnings suppressed (limit {} per {} ms)",
                    throttle.suppressed, throttle.cap, throttle.window_ms
                ));
            }
        }
        Commands::Fields { hex } => {
            let parser = FrameParser::new(&hex).context("Invalid frame")?;
            let header = parser.walk_header()?;
            let payload = parser.decode_header()?.payload_fields()?;
            let fields = serde_json::json!({ "header": header, "payload": payload });
            println!("{}", serde_json::to_string_pretty(&fields)?);
        }
    }

    Ok(())
}
