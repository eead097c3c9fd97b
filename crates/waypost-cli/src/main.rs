//! Waypost CLI: inspect and drain the offline location queue.
//!
//! Reads the same `WAYPOST_*` settings as the library (a `.env` file is honored).

use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use waypost_cli::{init_tracing, now_millis, SampleArgs};
use waypost_core::{Config, DeliveryErrorPolicy};
use waypost_storage::create_storage;
use waypost_worker::{BatchTaskOptions, HttpDelivery, OfflineQueue};

#[derive(Parser)]
#[command(name = "waypost", about = "Offline GPS location queue")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Queue a location sample
    Add(SampleArgs),
    /// Print every queued sample as JSON
    List,
    /// Print the number of queued samples
    Count,
    /// Remove queued samples captured at the given timestamp
    Remove {
        /// Capture time in milliseconds since epoch
        timestamp: i64,
    },
    /// Remove every queued sample
    Clear,
    /// Read or change the stored GPS device id
    DeviceId {
        #[command(subcommand)]
        sub: DeviceIdCommands,
    },
    /// Deliver queued samples once over HTTP
    Sync {
        /// Endpoint to POST samples to (overrides WAYPOST_DELIVERY_URL)
        #[arg(long)]
        endpoint: Option<String>,
        /// Pause after each delivery attempt, in milliseconds
        #[arg(long)]
        cooldown_ms: Option<u64>,
        /// Keep samples whose delivery errored instead of dropping them
        #[arg(long)]
        retain_on_error: bool,
    },
}

#[derive(Subcommand)]
enum DeviceIdCommands {
    /// Print the stored device id
    Get,
    /// Store a new device id (blank values are ignored)
    Set { id: String },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate()?;

    let storage = create_storage(&config)
        .await
        .context("Failed to open storage")?;
    let queue = OfflineQueue::new(storage);

    match cli.command {
        Commands::Add(sample) => {
            let item = sample.into_item(now_millis())?;
            queue.add(item.clone()).await?;
            print_json(&item)?;
        }
        Commands::List => {
            print_json(&queue.get_queue().await?)?;
        }
        Commands::Count => {
            print_json(&serde_json::json!({ "count": queue.len().await? }))?;
        }
        Commands::Remove { timestamp } => {
            let removed = queue.remove_by_timestamp(timestamp).await?;
            print_json(&serde_json::json!({ "removed": removed }))?;
        }
        Commands::Clear => {
            queue.clear().await?;
            print_json(&serde_json::json!({ "success": true }))?;
        }
        Commands::DeviceId { sub } => match sub {
            DeviceIdCommands::Get => {
                print_json(&serde_json::json!({ "gpsDeviceId": queue.gps_device_id().await }))?;
            }
            DeviceIdCommands::Set { id } => {
                queue.update_device_id(&id).await?;
                print_json(&serde_json::json!({ "gpsDeviceId": queue.gps_device_id().await }))?;
            }
        },
        Commands::Sync {
            endpoint,
            cooldown_ms,
            retain_on_error,
        } => {
            let handler = match endpoint {
                Some(url) => HttpDelivery::new(url, config.delivery_timeout)?
                    .with_token(config.delivery_token.clone()),
                None => HttpDelivery::from_config(&config)?,
            }
            .with_fallback_device_id(queue.gps_device_id().await);

            let mut options = BatchTaskOptions::from_config(&config);
            if let Some(ms) = cooldown_ms {
                options.cooldown = Duration::from_millis(ms);
            }
            if retain_on_error {
                options.on_delivery_error = DeliveryErrorPolicy::Retain;
            }

            tracing::info!(endpoint = handler.endpoint(), "Syncing offline queue");
            let result = queue.run_batch_task(&handler, &options).await?;
            print_json(&result)?;
        }
    }

    Ok(())
}
