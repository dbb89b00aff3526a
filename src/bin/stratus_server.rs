use std::{error::Error, net::SocketAddr, process};

use clap::Parser;
use log::info;
use stratus::{MemoryStore, Server};

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Listen for new connections at address
    address: SocketAddr,
    /// Seed the store with the demo dataset
    #[arg(long)]
    demo: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let cli = Cli::parse();
    let store = if cli.demo {
        MemoryStore::with_sample_data()
    } else {
        MemoryStore::new()
    };

    ctrlc::set_handler(|| {
        info!("shutting down");
        process::exit(0);
    })?;

    let server = Server::bind(cli.address, store)?;
    server.listen()?;
    Ok(())
}
