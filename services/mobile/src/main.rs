use std::sync::Arc;

use anyhow::Result;
use api::AppState;
use appwrite::AppwriteClient;
use common::AppwriteConfig;
use mobile::{AuthContext, WelcomeView, logging, welcome};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(logging::env_filter())
        .init();

    info!("Starting Aora");

    let config = AppwriteConfig::from_env()?;
    let client = AppwriteClient::new(&config)?;
    info!("Using backend at {}", client.endpoint());

    let state = AppState::new(Arc::new(client), config);

    print!("{}", welcome(&AuthContext::default()));
    let auth = AuthContext::load(&state.accounts).await;
    let view = welcome(&auth);
    if let WelcomeView::Redirect(route) = &view {
        info!("Redirecting to {}", route);
    }
    print!("{}", view);

    Ok(())
}
