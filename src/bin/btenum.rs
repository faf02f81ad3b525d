//! Scan for BLE devices, enumerate every one of them and save the report.
//!
//! Press Ctrl-C to stop early; the devices enumerated so far are still saved.

use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::{Parser, ValueEnum};

use btenum::export::{write_json_file, write_text_file};
use btenum::{BtleAdapter, DeviceOrder, EnumerationConfig, LogReporter, Result, ScanConfig, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Order {
    Shuffled,
    Discovered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Text,
    Both,
}

#[derive(Debug, Parser)]
#[command(name = "btenum", about = "Enumerate nearby BLE devices and their GATT services")]
struct Cli {
    /// Index of the Bluetooth adapter to use
    #[arg(short, long, default_value_t = 0)]
    adapter: usize,

    /// Seconds to listen for advertisements
    #[arg(long, default_value_t = 5)]
    scan_secs: u64,

    /// Seconds to wait for each connection
    #[arg(long, default_value_t = 10)]
    connect_timeout_secs: u64,

    /// Order in which devices are visited
    #[arg(long, value_enum, default_value_t = Order::Shuffled)]
    order: Order,

    /// Seed for a reproducible shuffled order
    #[arg(long)]
    seed: Option<u64>,

    /// Only enumerate devices that advertise a name
    #[arg(long)]
    named_only: bool,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Output file. The extension is replaced per format when writing both.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn ordering(&self) -> DeviceOrder {
        match (self.order, self.seed) {
            (Order::Discovered, _) => DeviceOrder::AsDiscovered,
            (Order::Shuffled, Some(seed)) => DeviceOrder::Seeded(seed),
            (Order::Shuffled, None) => DeviceOrder::Shuffled,
        }
    }

    fn output_path(&self, extension: &str) -> PathBuf {
        match &self.output {
            Some(path) if self.format == Format::Both => path.with_extension(extension),
            Some(path) => path.clone(),
            None => {
                let secs = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs();
                PathBuf::from(format!("bluetooth_enumeration_{}.{}", secs, extension))
            }
        }
    }
}

fn setup_logging(verbose: bool) {
    let filters = match std::env::var("RUST_LOG") {
        Ok(filters) if !verbose => filters,
        _ if verbose => "debug".to_owned(),
        _ => "info".to_owned(),
    };

    pretty_env_logger::formatted_builder()
        .parse_filters(&filters)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let mut scan = ScanConfig::default()
        .adapter_index(cli.adapter)
        .scan_duration(Duration::from_secs(cli.scan_secs));
    if cli.named_only {
        scan = scan.require_name();
    }
    let adapter = BtleAdapter::new(scan).await?;

    let session = Session::new(
        EnumerationConfig::default()
            .connect_timeout(Duration::from_secs(cli.connect_timeout_secs))
            .ordering(cli.ordering()),
    );

    let cancel = session.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Stopping enumeration... press Ctrl-C again to quit now");
            cancel.request_stop();
        }
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, no report written");
            std::process::exit(130);
        }
    });

    let result = session.start(&adapter, &LogReporter).await?;

    if matches!(cli.format, Format::Json | Format::Both) {
        let path = cli.output_path("json");
        write_json_file(&result, &path)?;
        log::info!("Results saved to {}", path.display());
    }
    if matches!(cli.format, Format::Text | Format::Both) {
        let path = cli.output_path("txt");
        write_text_file(&result, &path)?;
        log::info!("Results exported to {}", path.display());
    }

    Ok(())
}
