mod document;
mod error;
mod nlp;
mod outbound;
mod relational;
mod router;
mod settings;
mod web;

use std::process::exit;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use crate::outbound::document::DocumentApiClient;
use crate::outbound::relational::DbHubClient;
use crate::router::QueryRouter;
use crate::settings::{Args, Settings};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let settings = match Settings::from_file(&args.config) {
        Ok(settings) => settings,
        Err(error) => {
            eprintln!("Problem while loading configuration. {error}");
            exit(1);
        }
    };

    let relational = match DbHubClient::new(&settings.relational) {
        Ok(client) => client,
        Err(error) => {
            eprintln!("Problem while building relational client. {error}");
            exit(1);
        }
    };
    let document = match DocumentApiClient::new(&settings.document) {
        Ok(client) => client,
        Err(error) => {
            eprintln!("Problem while building document client. {error}");
            exit(1);
        }
    };

    let router = Arc::new(QueryRouter::new(Box::new(relational), Box::new(document)));

    info!(address = %settings.web.address, "serving analytics query API");
    web::serve(router, settings.web.address).await;
}
