/*!
 * iwscan CLI
 *
 * One scan cycle per invocation: scan the given interface, print the
 * discovered access points, then stream them over the result FIFO (unless
 * `--no-sink`). The FIFO open blocks until a consumer attaches.
 */

use std::path::PathBuf;

use clap::Parser;
use log::error;

use iwscan::core::{scan, sink};
use iwscan::{ScanError, WextTokenizer, WextTransport};

#[derive(Parser)]
#[command(name = "iwscan")]
#[command(version, about = "Wireless scan to FIFO: scans an interface and streams AP records to a consumer")]
struct Cli {
    /// Wireless interface to scan (wlan0, wlp2s0, ...).
    interface: String,

    /// Named pipe the result set is written to.
    #[arg(long, default_value = "/tmp/iw2log")]
    fifo: PathBuf,

    /// Print results only; skip the FIFO handshake.
    #[arg(long)]
    no_sink: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        error!("{}: {}", cli.interface, err);
        std::process::exit(err.exit_code());
    }
}

fn run(cli: &Cli) -> Result<(), ScanError> {
    let transport = WextTransport::open(&cli.interface).map_err(ScanError::Transport)?;
    let aps = scan::run_cycle(&transport, &WextTokenizer)?;

    println!("{} RESULTS", aps.len());
    for (i, ap) in aps.iter().enumerate() {
        println!("==== {}", i);
        println!("{}", ap.bssid_hex());
        println!("{}", ap.essid);
        println!("{}", ap.strength);
    }

    if !cli.no_sink {
        sink::write_results(&cli.fifo, &aps)?;
    }
    Ok(())
}
