//! Serve Gjesdal's waste collection calendar over HTTP.
//!
//! The calendar is served at `/calendar?route=<route>&waste_types=<ids>&alerts=<ids>`,
//! its summary at `/summary?route=<route>&waste_types=<ids>`.

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Result;
use axum::{routing::get, Router};
use clap::Parser;
use gwc_core::catalog::Catalog;
use log::info;

mod route;

#[derive(Debug, Parser)]
#[command(version, about = "Serve Gjesdal's waste collection calendar")]
struct Arguments {
    /// the address to listen on
    #[arg(long, env = "GWC_BIND", default_value = "0.0.0.0:8008")]
    bind: SocketAddr,
    /// read the catalog from this JSON file instead of the bundled one
    #[arg(long, env = "GWC_CATALOG")]
    catalog: Option<PathBuf>,
}

fn app(catalog: Catalog) -> Router {
    Router::new()
        .route("/calendar", get(route::calendar::handler))
        .route("/summary", get(route::summary::handler))
        .with_state(Arc::new(catalog))
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let arguments = Arguments::parse();
    let catalog = match &arguments.catalog {
        Some(path) => Catalog::load(path)?,
        None => Catalog::bundled()?,
    };
    info!(
        "serving {} routes on {}",
        catalog.routes.len(),
        arguments.bind
    );
    axum::Server::bind(&arguments.bind)
        .serve(app(catalog).into_make_service())
        .await?;
    Ok(())
}
