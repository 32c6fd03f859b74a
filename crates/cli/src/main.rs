//! Kat Cakes CLI - Catalog, cart and custom-order tools.
//!
//! Drives the storefront cart against the same durable storage document the
//! storefront uses, so a cart built here is what the next session loads.
//!
//! # Usage
//!
//! ```bash
//! # List the catalog, or one category
//! katcakes catalog list
//! katcakes catalog list --category cupcake
//!
//! # Add two units of product 3 to the cart and show it
//! katcakes cart add 3 -n 2
//! katcakes cart show
//!
//! # Configure a custom cake
//! katcakes order cake --size 30cm --topping ganache -q 2
//!
//! # Load the catalog from YAML instead of the built-in range
//! katcakes --catalog catalog.yaml catalog featured
//! ```
//!
//! # Commands
//!
//! - `catalog` - Browse or export the product catalog
//! - `cart` - Inspect and edit the cart
//! - `order` - Configure a custom cake, cupcake batch or special request

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use katcakes_core::{CakeSize, CakeTopping, Category, CupcakeTopping, Shape};
use katcakes_storefront::config::StorefrontConfig;
use katcakes_storefront::error::AppError;
use katcakes_storefront::telemetry::{DEFAULT_LOG_FILTER, init_sentry, init_tracing};

mod commands;

use commands::Context;
use commands::order::{CakeArgs, CupcakeArgs, OtherArgs};

#[derive(Parser)]
#[command(name = "katcakes")]
#[command(author, version, about = "Kat Cakes storefront tools")]
struct Cli {
    /// Load the catalog from a YAML file instead of the built-in range
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the product catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Inspect and edit the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Configure a custom order and add it to the cart
    Order {
        #[command(subcommand)]
        kind: OrderKind,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List products, optionally restricted to one category
    List {
        /// `cake`, `cupcake` or `other`
        #[arg(short, long)]
        category: Option<Category>,
    },
    /// List featured products
    Featured,
    /// Show one product
    Show {
        /// Product id
        id: String,
    },
    /// Write the catalog to a YAML file
    Export {
        /// Destination file
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart lines and total
    Show,
    /// Add a catalog product
    Add {
        /// Product id
        product_id: String,

        /// Number of units to add
        #[arg(short = 'n', long, default_value_t = 1)]
        count: u32,
    },
    /// Remove a line
    Remove {
        /// Entry id as printed by `cart show`
        entry_id: String,
    },
    /// Change the quantity of a line
    Quantity {
        /// Entry id as printed by `cart show`
        entry_id: String,

        /// New quantity (1 or more)
        quantity: u32,
    },
    /// Empty the cart
    Clear,
    /// Preview the checkout summary for the customer id stored on this
    /// storage document (not verified against the account service)
    Checkout,
}

#[derive(Subcommand)]
enum OrderKind {
    /// Custom cake
    Cake {
        /// `round` or `rectangle`
        #[arg(long)]
        shape: Option<Shape>,

        /// `15cm`, `18cm`, `20cm`, `22cm` or `30cm`
        #[arg(long)]
        size: Option<CakeSize>,

        #[arg(long)]
        flavor: Option<String>,

        #[arg(long)]
        filling: Option<String>,

        /// `marzipan`, `ganache` or `buttercream`
        #[arg(long)]
        topping: Option<CakeTopping>,

        #[arg(short, long)]
        quantity: Option<u32>,

        #[arg(long)]
        requests: Option<String>,

        #[arg(long)]
        allergies: Option<String>,
    },
    /// Batch of custom cupcakes (6 minimum)
    Cupcake {
        #[arg(long)]
        flavor: Option<String>,

        /// Frosting name, e.g. "Cream Cheese Frosting"
        #[arg(long)]
        topping: Option<CupcakeTopping>,

        #[arg(short, long)]
        quantity: Option<u32>,

        #[arg(long)]
        requests: Option<String>,

        #[arg(long)]
        allergies: Option<String>,
    },
    /// Special request, priced by quote
    Other {
        /// What you would like (10 characters minimum)
        #[arg(long)]
        requests: String,

        #[arg(long)]
        flavor: Option<String>,

        #[arg(short, long)]
        quantity: Option<u32>,

        #[arg(long)]
        allergies: Option<String>,
    },
}

fn main() -> ExitCode {
    init_tracing(DEFAULT_LOG_FILTER);

    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    let _sentry_guard = init_sentry(&config);

    match run(cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let _ = e.report();
            tracing::error!("Command failed: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, config: &StorefrontConfig) -> Result<(), AppError> {
    let ctx = Context::open(config, cli.catalog.as_deref(), cli.json)?;

    match cli.command {
        Commands::Catalog { action } => match action {
            CatalogAction::List { category } => commands::catalog::list(&ctx, category)?,
            CatalogAction::Featured => commands::catalog::featured(&ctx)?,
            CatalogAction::Show { id } => commands::catalog::show(&ctx, &id)?,
            CatalogAction::Export { file } => commands::catalog::export(&ctx, &file)?,
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&ctx)?,
            CartAction::Add { product_id, count } => {
                commands::cart::add(&ctx, &product_id, count)?;
            }
            CartAction::Remove { entry_id } => commands::cart::remove(&ctx, &entry_id)?,
            CartAction::Quantity { entry_id, quantity } => {
                commands::cart::set_quantity(&ctx, &entry_id, quantity)?;
            }
            CartAction::Clear => commands::cart::clear(&ctx)?,
            CartAction::Checkout => commands::cart::checkout(&ctx)?,
        },
        Commands::Order { kind } => match kind {
            OrderKind::Cake {
                shape,
                size,
                flavor,
                filling,
                topping,
                quantity,
                requests,
                allergies,
            } => {
                let args = CakeArgs {
                    shape,
                    size,
                    flavor,
                    filling,
                    topping,
                    quantity,
                    requests,
                    allergies,
                };
                commands::order::cake(&ctx, args)?;
            }
            OrderKind::Cupcake {
                flavor,
                topping,
                quantity,
                requests,
                allergies,
            } => {
                let args = CupcakeArgs {
                    flavor,
                    topping,
                    quantity,
                    requests,
                    allergies,
                };
                commands::order::cupcake(&ctx, args)?;
            }
            OrderKind::Other {
                requests,
                flavor,
                quantity,
                allergies,
            } => {
                let args = OtherArgs {
                    requests,
                    flavor,
                    quantity,
                    allergies,
                };
                commands::order::other(&ctx, args)?;
            }
        },
    }
    Ok(())
}
