use std::io::{self, BufRead, Write};
use std::time::Duration;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use bookings::client::view::Renderer;
use bookings::client::{BookingClient, ClientError};
use bookings::models::NewBooking;

/// Terminal client for the booking API
#[derive(Parser, Debug)]
#[command(name = "bookings")]
#[command(about = "List and create bookings", long_about = None)]
struct Cli {
    /// API base URL (e.g., http://localhost:3000/api)
    #[arg(long, env = "BOOKING_API_BASE_URL")]
    base_url: String,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show all bookings, ordered by date and time
    List {
        /// Exit on failure instead of offering to retry
        #[arg(long)]
        no_retry: bool,
    },
    /// Create a booking
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// HH:MM, 24-hour
        #[arg(long)]
        time: String,
        /// consultation, meeting, support or training
        #[arg(long = "service")]
        service_type: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Check that the backend and its database are reachable
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let client = BookingClient::new(&cli.base_url)?;
    if cli.no_color {
        colored::control::set_override(false);
    }
    let renderer = Renderer::new(!cli.no_color);

    match cli.command {
        Command::List { no_retry } => list(&client, &renderer, !no_retry).await,
        Command::Create {
            name,
            email,
            date,
            time,
            service_type,
            notes,
        } => {
            let booking = NewBooking {
                name,
                email,
                date,
                time,
                service_type,
                notes,
            };
            create(&client, &renderer, &booking).await
        }
        Command::Health => health(&client, &renderer).await,
    }
}

async fn list(client: &BookingClient, renderer: &Renderer, retry: bool) -> anyhow::Result<()> {
    loop {
        let spinner = loading_spinner("Loading bookings...");
        let result = client.get_all_bookings().await;
        spinner.finish_and_clear();

        match result {
            Ok(bookings) => {
                print!("{}", renderer.booking_list(&bookings));
                return Ok(());
            }
            Err(e) => {
                eprintln!("{}", renderer.error_state(&e.to_string()));
                if !retry || !confirm("Retry?")? {
                    return Err(e.into());
                }
            }
        }
    }
}

async fn create(
    client: &BookingClient,
    renderer: &Renderer,
    booking: &NewBooking,
) -> anyhow::Result<()> {
    let spinner = loading_spinner("Creating booking...");
    let result = client.create_booking(booking).await;
    spinner.finish_and_clear();

    match result {
        Ok(created) => {
            print!("{}", renderer.created(&created));
            Ok(())
        }
        Err(ClientError::Server {
            status,
            message,
            errors,
        }) => {
            eprintln!("{}", renderer.field_errors(&message, &errors));
            anyhow::bail!("server rejected booking ({status})")
        }
        Err(e) => {
            eprintln!("{}", renderer.error_state(&e.to_string()));
            Err(e.into())
        }
    }
}

async fn health(client: &BookingClient, renderer: &Renderer) -> anyhow::Result<()> {
    match client.test_connection().await {
        Ok(report) => {
            println!("{} (database: {})", report.message, report.database);
            Ok(())
        }
        Err(e) => {
            eprintln!(
                "{}",
                renderer.error_state(&format!("Backend server is not responding: {e}"))
            );
            Err(e.into())
        }
    }
}

fn loading_spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
