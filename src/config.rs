use std::env;

use serenity::model::prelude::*;

/// A category whose child-channel count is mirrored into a voice channel name.
pub struct TrackedCategory {
    pub category_id: ChannelId,
    /// The voice channel whose name displays the count.
    pub counter_vc_id: ChannelId,
    pub label: String,
}

/// All ids the bot operates on, read from the environment once at startup
/// and injected into the event handler.
pub struct BotConfig {
    pub guild_id: GuildId,
    /// Tickets first, then services.
    pub tracked: [TrackedCategory; 2],
    /// New channels under this category get a welcome embed.
    pub welcome_category_id: ChannelId,
    pub startup_log_channel_id: ChannelId,
    pub paid_client_role_id: RoleId,
    pub free_client_role_id: RoleId,
}

impl BotConfig {
    pub fn from_env() -> Self {
        let services_category_id = ChannelId(env_id("OPEN_SERVICES_CATEGORY_ID"));

        BotConfig {
            guild_id: GuildId(env_id("GUILD_ID")),
            tracked: [
                TrackedCategory {
                    category_id: ChannelId(env_id("OPEN_TICKETS_CATEGORY_ID")),
                    counter_vc_id: ChannelId(env_id("OPEN_TICKETS_VC_ID")),
                    label: "Open Tickets".to_string(),
                },
                TrackedCategory {
                    category_id: services_category_id,
                    counter_vc_id: ChannelId(env_id("OPEN_SERVICES_VC_ID")),
                    label: "Open Service Requests".to_string(),
                },
            ],
            welcome_category_id: services_category_id,
            startup_log_channel_id: ChannelId(env_id("STARTUP_LOG_CHANNEL_ID")),
            paid_client_role_id: RoleId(env_id("PAID_CLIENT_ROLE_ID")),
            free_client_role_id: RoleId(env_id("FREE_CLIENT_ROLE_ID")),
        }
    }
}

fn env_id(key: &str) -> u64 {
    env::var(key)
        .unwrap_or_else(|_| panic!("Expected {} in environment", key))
        .parse()
        .unwrap_or_else(|_| panic!("{} must be an integer", key))
}
