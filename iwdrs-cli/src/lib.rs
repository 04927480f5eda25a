pub mod output;

use anyhow::{Context, bail};
use clap::{ArgAction, Parser, Subcommand};
use iwdrs::{BackendConfig, IwdBackend};
use log::debug;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

use crate::output::{print_networks, print_status};

#[derive(Parser, Debug)]
#[command(name = "iwdrs")]
#[command(version, about = "Inspect and control Wi-Fi through iwd")]
struct Args {
    /// Wireless interface to manage (first station device if unset)
    #[arg(short, long, env = "IWDRS_DEVICE")]
    device: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List visible networks, most preferred first
    List,
    /// Scan and list the results
    Scan {
        /// Seconds to wait for the scan to finish
        #[arg(short, long, default_value_t = 15)]
        timeout: u64,
    },
    /// Connect to a network by id (object path)
    Connect { id: String },
    /// Disconnect the station
    Disconnect,
    /// Show the current network and whether a connection is in progress
    Status,
    /// Print the network list after every finished scan until interrupted
    Watch,
}

pub async fn run() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let scans = Arc::new(Notify::new());
    let mut config = BackendConfig::new().with_scan_listener({
        let scans = Arc::clone(&scans);
        move || scans.notify_waiters()
    });
    if let Some(device) = &args.device {
        config = config.with_device_name(device.clone());
    }

    let mut backend = IwdBackend::new(config);
    if !backend.can_load().await {
        bail!("iwd is not running on the system bus");
    }
    backend.load().await.context("failed to load iwd backend")?;
    debug!("Loaded backend for {:?}", backend.config().device_name);

    match args.command {
        Command::List => print_networks(&backend),
        Command::Scan { timeout } => {
            scan_and_wait(&scans, backend.scan(), Duration::from_secs(timeout)).await?;
            print_networks(&backend);
        }
        Command::Connect { id } => {
            let net = backend.get_network_properties(&id)?;
            backend
                .connect(&id)
                .await
                .with_context(|| format!("failed to connect to {}", net.essid))?;
            println!("Connected to {}", net.essid);
        }
        Command::Disconnect => {
            backend.disconnect().await.context("disconnect failed")?;
            println!("Disconnected");
        }
        Command::Status => print_status(&backend),
        Command::Watch => {
            loop {
                let next = scans.notified();
                tokio::pin!(next);
                print_networks(&backend);
                tokio::select! {
                    _ = &mut next => println!(),
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
        }
    }

    backend.unload();
    Ok(())
}

/// Issues `request` and waits for the next finished scan.
///
/// The wait is registered before the request goes out, so only scans that
/// finish afterwards count.
async fn scan_and_wait<F>(scans: &Notify, request: F, timeout: Duration) -> anyhow::Result<()>
where
    F: Future<Output = iwdrs::Result<()>>,
{
    let finished = scans.notified();
    request.await.context("scan request failed")?;
    tokio::time::timeout(timeout, finished)
        .await
        .context("scan did not finish in time")
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}
