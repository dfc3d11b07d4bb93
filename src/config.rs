use battlenet_api::client::{DEFAULT_REGION, DEFAULT_SEASON};
use battlenet_api::discord::DEFAULT_BOT_NAME;
use std::path::PathBuf;

/// Post Diablo III season rift standings for a set of battle tags to Discord.
#[derive(clap::Parser, Clone, Debug)]
#[clap(version, about)]
pub struct Config {
    /// Job payload (`{"rifts": {"<category>": ["<battle tag>", ...]}}`).
    /// Read from stdin when omitted or `-`.
    pub payload: Option<PathBuf>,

    #[clap(long, env = "BATTLENET_CLIENT_ID", hide_env_values = true)]
    pub client_id: String,

    #[clap(long, env = "BATTLENET_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: String,

    #[clap(long, env = "BATTLENET_REGION", default_value = DEFAULT_REGION)]
    pub region: String,

    #[clap(long, env = "D3_SEASON", default_value_t = DEFAULT_SEASON)]
    pub season: u32,

    #[clap(long, env = "DISCORD_BOT_NAME", default_value = DEFAULT_BOT_NAME)]
    pub bot_name: String,

    #[clap(long, env = "DISCORD_BOT_WEBHOOK_URL", hide_env_values = true)]
    pub webhook_url: String,

    #[clap(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}
