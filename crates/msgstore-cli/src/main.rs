use clap::{ArgAction, Parser, Subcommand};
use msgstore_sdk::{
    ClientConfig, Consumer, Entry, PollOutcome, PollingConsumer, Producer, WireEntry,
    encode_entry,
};
use serde::Serialize;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "msgstore-cli")]
#[command(about = "Command-line client for the HTTP message store")]
struct Cli {
    /// Store host; falls back to MSGSTORE_HOST.
    #[arg(long, global = true)]
    host: Option<String>,
    /// Store port; falls back to MSGSTORE_PORT.
    #[arg(long, global = true)]
    port: Option<u16>,
    /// Per-request deadline; falls back to MSGSTORE_TIMEOUT_MS, then 30s.
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Produce(ProduceArgs),
    Get(GetArgs),
    Poll(PollArgs),
    Tail(TailArgs),
}

#[derive(clap::Args, Debug)]
struct ProduceArgs {
    #[arg(long)]
    topic: String,
    #[arg(long)]
    key: Option<String>,
    #[arg(long)]
    value: String,
}

#[derive(clap::Args, Debug)]
struct GetArgs {
    #[arg(long)]
    topic: String,
    #[arg(long, allow_negative_numbers = true)]
    offset: i64,
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
}

#[derive(clap::Args, Debug)]
struct PollArgs {
    #[arg(long)]
    topic: String,
    #[arg(long, allow_negative_numbers = true)]
    offset: i64,
    #[arg(long, default_value_t = 5_000)]
    poll_ms: u64,
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
}

#[derive(clap::Args, Debug)]
struct TailArgs {
    #[arg(long)]
    topic: String,
    /// Last offset already seen; the first entry printed is the one after it.
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    from: i64,
    #[arg(long, default_value_t = 5_000)]
    poll_ms: u64,
    /// Stop after this many entries.
    #[arg(long)]
    max: Option<usize>,
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
}

#[derive(Serialize)]
struct EntryOutput<'a> {
    topic: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    #[serde(flatten)]
    wire: WireEntry,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let result = match client_config(&cli) {
        Ok(config) => match cli.command {
            Commands::Produce(args) => produce_command(config, args).await,
            Commands::Get(args) => get_command(config, args).await,
            Commands::Poll(args) => poll_command(config, args).await,
            Commands::Tail(args) => tail_command(config, args).await,
        },
        Err(error) => Err(error),
    };

    match result {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn client_config(cli: &Cli) -> Result<ClientConfig, String> {
    let mut config = ClientConfig::from_env().map_err(|error| error.to_string())?;
    if let Some(host) = &cli.host {
        config.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.timeout = Some(Duration::from_millis(timeout_ms));
    }
    Ok(config)
}

async fn produce_command(config: ClientConfig, args: ProduceArgs) -> Result<ExitCode, String> {
    let producer = Producer::new(config).map_err(|error| error.to_string())?;
    let entry = Entry::new(args.key.unwrap_or_default(), args.value);
    let offset = producer
        .send_entry(&args.topic, &entry)
        .await
        .map_err(|error| error.to_string())?;
    println!("offset: {offset}");
    Ok(ExitCode::SUCCESS)
}

async fn get_command(config: ClientConfig, args: GetArgs) -> Result<ExitCode, String> {
    let consumer = Consumer::new(config).map_err(|error| error.to_string())?;
    let entry = consumer
        .get_entry(&args.topic, args.offset)
        .await
        .map_err(|error| error.to_string())?;
    print_entry(&args.topic, Some(args.offset), &entry, args.json)?;
    Ok(ExitCode::SUCCESS)
}

async fn poll_command(config: ClientConfig, args: PollArgs) -> Result<ExitCode, String> {
    let consumer = PollingConsumer::new(config).map_err(|error| error.to_string())?;
    let outcome = consumer
        .poll_for_next_entry(
            &args.topic,
            args.offset,
            Duration::from_millis(args.poll_ms),
        )
        .await
        .map_err(|error| error.to_string())?;
    match outcome {
        PollOutcome::Entry(entry) => print_entry(&args.topic, None, &entry, args.json)?,
        PollOutcome::Empty => println!("no entry within poll window"),
    }
    Ok(ExitCode::SUCCESS)
}

/// Follows a topic. The cursor advances by one per entry; empty windows are
/// polled again. The first error ends the command.
async fn tail_command(config: ClientConfig, args: TailArgs) -> Result<ExitCode, String> {
    let consumer = PollingConsumer::new(config).map_err(|error| error.to_string())?;
    let poll_duration = Duration::from_millis(args.poll_ms);
    let mut cursor = args.from;
    let mut printed = 0usize;

    while args.max.is_none_or(|max| printed < max) {
        let outcome = consumer
            .poll_for_next_entry(&args.topic, cursor, poll_duration)
            .await
            .map_err(|error| error.to_string())?;
        match outcome {
            PollOutcome::Entry(entry) => {
                cursor = cursor
                    .checked_add(1)
                    .ok_or_else(|| format!("offset cursor cannot advance past {cursor}"))?;
                printed += 1;
                print_entry(&args.topic, Some(cursor), &entry, args.json)?;
            }
            PollOutcome::Empty => {
                tracing::debug!(topic = %args.topic, cursor, "poll window elapsed; polling again");
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_entry(topic: &str, offset: Option<i64>, entry: &Entry, json: bool) -> Result<(), String> {
    if json {
        let output = EntryOutput {
            topic,
            offset,
            wire: encode_entry(entry),
        };
        let line = serde_json::to_string(&output).map_err(|error| error.to_string())?;
        println!("{line}");
        return Ok(());
    }

    if let Some(offset) = offset {
        println!("offset: {offset}");
    }
    println!("key: {}", String::from_utf8_lossy(&entry.key));
    println!("value: {}", String::from_utf8_lossy(&entry.value));
    println!("timestamp: {}", entry.timestamp.to_rfc3339());
    Ok(())
}
