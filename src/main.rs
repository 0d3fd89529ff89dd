//! `bb84`: run BB84 quantum key distribution simulations from the terminal.

use anyhow::{Context, Result};
use bb84_sim::protocols::analysis::{self, EVE_DETECTION_THRESHOLD, KeyStatistics};
use bb84_sim::protocols::bb84::{self, SessionResult};
use bb84_sim::{QuantumSimulator, SimulationConfig};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bb84")]
#[command(about = "BB84 quantum key distribution simulator")]
#[command(version)]
struct Cli {
    /// JSON configuration file, layered over BB84_* variables (flags override both)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level: error, warn, info, debug, trace (RUST_LOG takes precedence)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Print machine-readable JSON instead of a report
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Default)]
struct SessionArgs {
    /// Number of qubits Alice sends
    #[arg(long, short = 'n')]
    qubits: Option<usize>,

    /// Channel bit-flip probability in [0, 1]
    #[arg(long, short = 'p')]
    channel_error: Option<f64>,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single BB84 session
    Run {
        #[command(flatten)]
        session: SessionArgs,

        /// Put an intercept-resend eavesdropper on the line
        #[arg(long)]
        eve: bool,

        /// Print the raw bit and basis sequences
        #[arg(long)]
        show_bits: bool,
    },

    /// Run the same parameters with and without an eavesdropper
    Compare {
        #[command(flatten)]
        session: SessionArgs,
    },

    /// Run repeated sessions and report the pooled error rate
    Trials {
        #[command(flatten)]
        session: SessionArgs,

        /// Put an intercept-resend eavesdropper on the line
        #[arg(long)]
        eve: bool,

        /// Number of sessions
        #[arg(long, short = 't')]
        trials: Option<usize>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let base = SimulationConfig::layered(std::env::vars(), cli.config.as_deref())
        .context("loading configuration")?;

    match cli.command {
        Commands::Run {
            session,
            eve,
            show_bits,
        } => {
            let mut config = apply(base, &session);
            config.eve_present |= eve;

            let result = config.run()?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_session(&result, show_bits);
            }
        }
        Commands::Compare { session } => {
            let config = apply(base, &session);

            let mut source = config.random_source();
            let cmp = analysis::compare_eavesdropping(
                &mut source,
                config.n_bits,
                config.channel_error_rate,
            )?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&cmp)?);
            } else {
                let (clean, tapped) = cmp.statistics();
                println!("Comparison: with vs. without Eve ({} qubits)\n", config.n_bits);
                println!("  {:<18} {:>12} {:>12}", "", "Without Eve", "With Eve");
                println!("  {}", "-".repeat(44));
                println!(
                    "  {:<18} {:>12} {:>12}",
                    "Error rate",
                    fmt_rate(clean.error_rate),
                    fmt_rate(tapped.error_rate)
                );
                println!(
                    "  {:<18} {:>12.4} {:>12.4}",
                    "Key size ratio", clean.key_utilization, tapped.key_utilization
                );
                println!(
                    "  {:<18} {:>12} {:>12}",
                    "Bit agreement",
                    fmt_rate(clean.bit_agreement),
                    fmt_rate(tapped.bit_agreement)
                );
                println!(
                    "  {:<18} {:>12} {:>12}",
                    "Eve detected",
                    fmt_flag(clean.eve_detected),
                    fmt_flag(tapped.eve_detected)
                );
                if let Some(increase) = cmp.error_rate_increase() {
                    println!("\nEve raised the error rate by {increase:.4}");
                }
                println!("Detection threshold: error rate above {EVE_DETECTION_THRESHOLD:.2}");
            }
        }
        Commands::Trials {
            session,
            eve,
            trials,
        } => {
            let mut config = apply(base, &session);
            config.eve_present |= eve;
            if let Some(trials) = trials {
                config.trials = trials;
            }

            let sim = QuantumSimulator::new(config.n_bits)
                .with_channel(config.channel()?)
                .with_eavesdropper(config.eve_present);
            let summary = sim.sample(&mut config.random_source(), config.trials)?;
            let expected_without_eve =
                analysis::expected_error_rate(config.channel_error_rate, false)?;
            let expected_with_eve = analysis::expected_error_rate(config.channel_error_rate, true)?;

            if cli.json {
                let report = serde_json::json!({
                    "config": config,
                    "summary": summary,
                    "expected_error_rate": {
                        "without_eve": expected_without_eve,
                        "with_eve": expected_with_eve,
                    },
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "{} sessions of {} qubits (channel error {:.3}, eve: {})\n",
                    summary.trials, config.n_bits, config.channel_error_rate, config.eve_present
                );
                println!("  Mean sifted length   {:.1}", summary.mean_sifted_length);
                println!("  Empty sifted keys    {}", summary.empty_sessions);
                println!("  Pooled error rate    {}", fmt_rate(summary.pooled_error_rate));
                println!("  Expected (no Eve)    {expected_without_eve:.4}");
                println!("  Expected (with Eve)  {expected_with_eve:.4}");
                if let Some(rate) = summary.pooled_error_rate {
                    let verdict = if analysis::eve_detected(rate) { "yes" } else { "no" };
                    println!("  Eve detected         {verdict}");
                }
            }
        }
    }

    Ok(())
}

/// Overlays command-line flags on the loaded configuration.
fn apply(mut config: SimulationConfig, session: &SessionArgs) -> SimulationConfig {
    if let Some(n) = session.qubits {
        config.n_bits = n;
    }
    if let Some(p) = session.channel_error {
        config.channel_error_rate = p;
    }
    if session.seed.is_some() {
        config.seed = session.seed;
    }
    config
}

fn fmt_rate(rate: Option<f64>) -> String {
    rate.map_or_else(|| "n/a".to_string(), |r| format!("{r:.4}"))
}

fn fmt_flag(flag: Option<bool>) -> &'static str {
    match flag {
        Some(true) => "yes",
        Some(false) => "no",
        None => "n/a",
    }
}

fn print_session(result: &SessionResult, show_bits: bool) {
    let stats = KeyStatistics::from_session(result);

    if show_bits {
        println!("Alice bits     {}", bb84::format_bits(result.sender_bits()));
        println!("Alice bases    {}", bb84::format_bases(result.sender_bases()));
        println!("Bob bases      {}", bb84::format_bases(result.receiver_bases()));
        println!("Bob bits       {}", bb84::format_bits(result.receiver_bits()));
        println!("Alice key      {}", bb84::format_bits(result.sifted_sender_key()));
        println!("Bob key        {}\n", bb84::format_bits(result.sifted_receiver_key()));
    }

    println!("Key statistics");
    println!("  Total bits transmitted  {}", stats.total_bits);
    println!("  Sifted key size         {}", stats.sifted_length);
    println!("  Error rate              {}", fmt_rate(stats.error_rate));
    println!("  Key utilization rate    {:.1}%", stats.key_utilization * 100.0);
    match stats.bit_agreement {
        Some(agreement) => println!("  Bit agreement           {:.1}%", agreement * 100.0),
        None => println!("  Bit agreement           n/a"),
    }

    println!("\nSecurity analysis");
    match stats.security_level {
        Some(level) => println!("  {level}: {}", level.description()),
        None => println!("  No sifted bits, error rate undefined"),
    }
    if result.eve_present() {
        println!("  The simulation included a spy (Eve)");
    } else {
        println!("  The simulation was run without a spy");
    }
    if let Some(outcome) = stats.detection {
        println!("  {}", outcome.description());
    }
}
