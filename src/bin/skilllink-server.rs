// ABOUTME: Marketplace HTTP server binary
// ABOUTME: Loads configuration, connects the database, and serves the booking API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SkillLink

//! # SkillLink Marketplace Server Binary
//!
//! Starts the booking API with environment-driven configuration.

use anyhow::Result;
use clap::Parser;
use skilllink_marketplace::{
    config::ServerConfig,
    database::Database,
    logging,
    routes::{self, AppState},
    services::bookings::BookingService,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "skilllink-server")]
#[command(about = "SkillLink Marketplace - trainer booking API")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = args.database_url {
        config.database_url = skilllink_marketplace::config::DatabaseUrl::parse_url(&database_url)?;
    }

    logging::init_from_env()?;

    info!("Starting SkillLink Marketplace server");
    info!("{}", config.summary());

    let database = Database::new(&config.database_url.to_connection_string()).await?;
    info!("Database connected and migrated");

    let booking = BookingService::new(database, config.booking_timeout());
    let app = routes::router(AppState { booking });

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install shutdown signal handler: {e}");
    }
}
