use clap::{Parser, Subcommand};
use fountain::fec::{EncodingPacket, TransmissionInfo, CODEBOOK_VERSION};
use fountain::{logger, telemetry, CodecConfig, Decoder, Encoder, EncodingPlan};
use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::error::Error;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// Print Prometheus metrics before exiting
    #[clap(long, global = true)]
    metrics: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encodes a file into a packet stream
    Encode {
        #[clap(short, long)]
        input: PathBuf,

        #[clap(short, long)]
        output: PathBuf,

        /// Symbol size in bytes (overrides the config file)
        #[clap(short = 't', long)]
        symbol_size: Option<usize>,

        /// Number of repair symbols (overrides the configured overhead)
        #[clap(short, long)]
        repair: Option<u32>,

        /// Path to a TOML file with a [codec] table
        #[clap(short, long)]
        config: Option<PathBuf>,
    },
    /// Decodes a packet stream back into the original file
    Decode {
        #[clap(short, long)]
        input: PathBuf,

        #[clap(short, long)]
        output: PathBuf,

        /// Drop this many random packets before decoding
        #[clap(long, default_value_t = 0)]
        drop: usize,

        #[clap(long, default_value_t = 0)]
        seed: u64,
    },
    /// Runs random-loss trials and prints a JSON report
    Simulate {
        #[clap(long, default_value_t = 100_000)]
        size: usize,

        #[clap(short = 't', long, default_value_t = 1400)]
        symbol_size: usize,

        /// Independent packet loss probability
        #[clap(long, default_value_t = 0.1)]
        loss: f64,

        /// Extra repair symbols beyond the expected loss
        #[clap(long, default_value_t = 2)]
        overhead: u32,

        #[clap(long, default_value_t = 20)]
        trials: usize,

        #[clap(long, default_value_t = 0)]
        seed: u64,
    },
}

/// On-disk packet stream written by `encode`.
#[derive(Serialize, Deserialize)]
struct PacketStream {
    codebook_version: u16,
    info: TransmissionInfo,
    sha256: Vec<u8>,
    packets: Vec<Vec<u8>>,
}

fn main() {
    let cli = Cli::parse();
    let config = match &cli.command {
        Commands::Encode {
            config: Some(path), ..
        } => match CodecConfig::from_file(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("failed to load {}: {}", path.display(), e);
                std::process::exit(2);
            }
        },
        _ => CodecConfig::default(),
    };
    logger::init_with_default(&config.log_level);

    let result = match cli.command {
        Commands::Encode {
            input,
            output,
            symbol_size,
            repair,
            ..
        } => run_encode(&config, &input, &output, symbol_size, repair),
        Commands::Decode {
            input,
            output,
            drop,
            seed,
        } => run_decode(&input, &output, drop, seed),
        Commands::Simulate {
            size,
            symbol_size,
            loss,
            overhead,
            trials,
            seed,
        } => run_simulate(size, symbol_size, loss, overhead, trials, seed),
    };

    if cli.metrics {
        match telemetry::gather() {
            Ok(text) => print!("{}", text),
            Err(e) => warn!("metrics unavailable: {}", e),
        }
    }
    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run_encode(
    config: &CodecConfig,
    input: &Path,
    output: &Path,
    symbol_size: Option<usize>,
    repair: Option<u32>,
) -> Result<(), Box<dyn Error>> {
    let payload = std::fs::read(input)?;
    let t = symbol_size.unwrap_or(config.symbol_size);
    let cfg = CodecConfig {
        symbol_size: t,
        ..config.clone()
    };
    cfg.validate()?;
    let k = cfg.check_payload(payload.len())?;
    let repair = repair.unwrap_or_else(|| cfg.repair_count(k));

    let encoder = Encoder::construct(&payload, t)?;
    let packets: Vec<EncodingPacket> = if cfg.parallel_repair {
        encoder.get_encoded_packets(repair)
    } else {
        let mut packets = encoder.get_encoded_packets(0);
        packets.extend(encoder.repair_packets(0).take(repair as usize));
        packets
    };

    let stream = PacketStream {
        codebook_version: CODEBOOK_VERSION,
        info: encoder.transmission_info(),
        sha256: Sha256::digest(&payload).to_vec(),
        packets: packets.iter().map(EncodingPacket::to_bytes).collect(),
    };
    std::fs::write(output, bincode::serialize(&stream)?)?;
    info!(
        "encoded {} bytes into {} source + {} repair packets of {} bytes",
        payload.len(),
        encoder.source_symbols(),
        repair,
        t
    );
    Ok(())
}

fn run_decode(
    input: &Path,
    output: &Path,
    drop: usize,
    seed: u64,
) -> Result<(), Box<dyn Error>> {
    let stream: PacketStream = bincode::deserialize(&std::fs::read(input)?)?;
    if stream.codebook_version != CODEBOOK_VERSION {
        return Err(format!(
            "stream uses codebook {}, this build speaks {}",
            stream.codebook_version, CODEBOOK_VERSION
        )
        .into());
    }

    let mut packets = stream.packets;
    let mut rng = StdRng::seed_from_u64(seed);
    packets.shuffle(&mut rng);
    packets.truncate(packets.len().saturating_sub(drop));

    let mut decoder = Decoder::with_info(stream.info)?;
    let mut payload = None;
    for raw in &packets {
        match decoder.decode_bytes(raw) {
            Ok(Some(p)) => {
                payload = Some(p);
                break;
            }
            Ok(None) => {}
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => warn!("skipping packet: {}", e),
        }
    }
    let payload = payload.ok_or_else(|| {
        format!(
            "not enough symbols: {} received, block needs about {}",
            decoder.received_count(),
            decoder.params().k_prime
        )
    })?;
    if Sha256::digest(&payload).as_slice() != stream.sha256.as_slice() {
        return Err("decoded payload does not match its digest".into());
    }
    std::fs::write(output, &payload)?;
    info!("decoded {} bytes from {} packets", payload.len(), decoder.received_count());
    Ok(())
}

fn run_simulate(
    size: usize,
    symbol_size: usize,
    loss: f64,
    overhead: u32,
    trials: usize,
    seed: u64,
) -> Result<(), Box<dyn Error>> {
    if !(0.0..1.0).contains(&loss) {
        return Err(format!("loss must be in [0, 1), got {}", loss).into());
    }
    if size == 0 || symbol_size == 0 {
        return Err("size and symbol size must be positive".into());
    }
    // every trial has the same K, so one elimination serves them all
    let plan = EncodingPlan::generate(size.div_ceil(symbol_size))?;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut successes = 0usize;
    let mut symbols_used = 0usize;
    let mut k = 0usize;
    let mut k_prime = 0usize;

    for trial in 0..trials {
        let payload: Vec<u8> = (0..size).map(|_| rng.gen()).collect();
        let encoder = Encoder::with_plan(&payload, symbol_size, &plan)?;
        k = encoder.source_symbols();
        k_prime = encoder.params().k_prime;
        let expected_loss = (k as f64 * loss / (1.0 - loss)).ceil() as u32;
        let packets = encoder.get_encoded_packets(expected_loss + overhead);

        let mut decoder = Decoder::with_info(encoder.transmission_info())?;
        let mut done = false;
        for p in packets {
            if rng.gen::<f64>() < loss {
                continue;
            }
            if decoder.decode(p)?.is_some() {
                done = true;
                break;
            }
        }
        if done && decoder.payload() == Some(payload.as_slice()) {
            successes += 1;
            symbols_used += decoder.received_count();
        } else {
            info!("trial {} failed with {} symbols", trial, decoder.received_count());
        }
    }

    let report = serde_json::json!({
        "trials": trials,
        "successes": successes,
        "failures": trials - successes,
        "source_symbols": k,
        "padded_symbols": k_prime,
        "loss": loss,
        "mean_symbols_used": if successes > 0 { symbols_used as f64 / successes as f64 } else { 0.0 },
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
