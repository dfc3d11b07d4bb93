mod config;
mod job;

use crate::config::Config;
use battlenet_api::auth::ClientCredentials;
use battlenet_api::client::BattlenetApi;
use battlenet_api::discord::DiscordWebhook;
use chrono::Utc;
use clap::Parser;
use log::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    better_panic::install();

    let config = Config::parse();
    structured_logger::Builder::with_level(&config.log_level).init();

    let payload = job::read_payload(config.payload.as_deref())?;
    info!(
        "tracking {} rift(s) for season {} in region {}",
        payload.rifts.len(),
        config.season,
        config.region
    );

    let api = BattlenetApi::new(
        ClientCredentials::new(config.client_id.as_str(), config.client_secret.as_str()),
        &config.region,
    )?;
    let webhook = DiscordWebhook::new(config.bot_name.as_str(), &config.webhook_url)?;

    // Any failure aborts the whole run; the error becomes the exit status.
    job::track_leaderboard(&api, &webhook, config.season, &payload, Utc::now()).await?;
    Ok(())
}
