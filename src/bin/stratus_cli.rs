use std::{error::Error, fmt::Display, io, net::SocketAddr};

use clap::Parser;
use stratus::{Client, ClientError, Command, prompt};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Address of a running server
    address: SocketAddr,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let cli = Cli::parse();
    let client = Client::new();
    client.connect(&cli.address.ip().to_string(), cli.address.port())?;
    println!("connected to {}", cli.address);

    let stdio = io::stdin();
    let stdout = io::stdout();

    loop {
        let reader = stdio.lock();
        let writer = stdout.lock();

        let cmd = match prompt(reader, writer) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("error: {e}");
                continue;
            }
        };

        if let Command::Exit = cmd {
            if let Err(e) = client.close() {
                eprintln!("failed to close the connection cleanly: {e}");
            }
            break;
        }

        match run(&client, cmd) {
            Ok(()) => {}
            Err(ClientError::ConnectionLost) => {
                eprintln!("connection lost");
                break;
            }
            Err(e) => eprintln!("error: {e}"),
        }
    }

    Ok(())
}

/// Execute one command against the remote store and print the result.
fn run(client: &Client, command: Command) -> Result<(), ClientError> {
    match command {
        Command::Ping => println!("rtt: {:?}", client.ping()?),
        Command::Begin => client.begin()?,
        Command::End => client.end()?,
        Command::SearchAreasByName(name) => print_all(client.search_areas_by_name(&name)?),
        Command::SearchAreasByCountry(country) => {
            print_all(client.search_areas_by_country(&country)?)
        }
        Command::SearchAreasByCoords {
            latitude,
            longitude,
        } => print_all(client.search_areas_by_coords(latitude, longitude)?),
        Command::SearchCentersByName(name) => print_all(client.search_centers_by_name(&name)?),
        Command::Area(geoname_id) => println!("{}", client.area(geoname_id)?),
        Command::Center(center_id) => println!("{}", client.center(&center_id)?),
        Command::Centers => print_all(client.centers()?),
        Command::Categories => print_all(client.categories()?),
        Command::Average {
            geoname_id,
            category,
            center_id,
        } => println!(
            "{}",
            client.parameters_average(geoname_id, &center_id, &category)?
        ),
        Command::Monitors {
            geoname_id,
            center_id,
        } => println!("{}", client.monitors(&center_id, geoname_id)?),
        Command::Employs { user_id, center_id } => {
            println!("{}", client.employs(&center_id, &user_id)?)
        }
        Command::Help => help(),
        // Handled by the prompt loop.
        Command::Exit => {}
    }
    Ok(())
}

fn print_all<T: Display>(items: Vec<T>) {
    if items.is_empty() {
        println!("no results");
        return;
    }
    for item in items {
        println!("{item}");
    }
}

fn help() {
    println!(
        "\
commands:
  ping
  begin | end
  search-name <text>
  search-country <text>
  search-coords <latitude> <longitude>
  search-centers <text>
  area <geoname-id>
  center <center-id>
  centers
  categories
  average <geoname-id> <category> <center-id>
  monitors <geoname-id> <center-id>
  employs <user-id> <center-id>
  help
  exit"
    );
}
