//! TicketLive CLI - a command-line storefront consumer.
//!
//! Drives the session and cart managers the way the site's UI components
//! do: sign in, browse the catalog, and manage ticket selections. State
//! persists to the local storage file between invocations, so a `login`
//! followed later by `cart add` behaves like one browsing session.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! ticketlive events
//!
//! # Sign in / out
//! ticketlive login -e ana@example.com -p secret
//! ticketlive logout
//!
//! # Manage the cart
//! ticketlive cart add 3
//! ticketlive cart show
//! ticketlive cart decrease 3
//! ```
//!
//! # Commands
//!
//! - `events` - List the event catalog
//! - `login` / `register` / `logout` / `whoami` - Session operations
//! - `cart` - Show and mutate the pending ticket selections

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ticketlive")]
#[command(author, version, about = "TicketLive storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the event catalog
    Events,
    /// Sign in with email and password
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Create a new account (does not sign in)
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,

        /// Phone number
        #[arg(long)]
        phone: Option<String>,

        /// Postal address
        #[arg(long)]
        address: Option<String>,
    },
    /// Sign out and clear the persisted session
    Logout,
    /// Show the current session
    Whoami {
        /// Re-derive the session from the profile collaborator first
        #[arg(long)]
        refresh: bool,
    },
    /// Manage the ticket cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart lines, count, and total
    Show,
    /// Add one ticket for an event
    Add {
        /// Catalog id of the event
        event_id: i32,
    },
    /// Add one ticket to an existing line
    Increase {
        /// Catalog id of the event
        event_id: i32,
    },
    /// Remove one ticket from a line
    Decrease {
        /// Catalog id of the event
        event_id: i32,
    },
    /// Remove a line entirely
    Remove {
        /// Catalog id of the event
        event_id: i32,
    },
    /// Empty the cart
    Clear,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Events => commands::catalog::events().await?,
        Commands::Login { email, password } => commands::auth::login(&email, password).await?,
        Commands::Register {
            name,
            email,
            password,
            phone,
            address,
        } => commands::auth::register(&name, &email, password, phone, address).await?,
        Commands::Logout => commands::auth::logout()?,
        Commands::Whoami { refresh } => commands::auth::whoami(refresh).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show()?,
            CartAction::Add { event_id } => commands::cart::add(event_id).await?,
            CartAction::Increase { event_id } => commands::cart::increase(event_id)?,
            CartAction::Decrease { event_id } => commands::cart::decrease(event_id)?,
            CartAction::Remove { event_id } => commands::cart::remove(event_id)?,
            CartAction::Clear => commands::cart::clear()?,
        },
    }
    Ok(())
}
