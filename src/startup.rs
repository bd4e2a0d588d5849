//! Startup banner posted to the log channel once the gateway session is up.

use log::{error, warn};
use serenity::model::prelude::*;
use serenity::prelude::*;

const EMBED_COLOR: u32 = 0x8000ff;

pub async fn post_startup_banner(
    ctx: &Context,
    ready: &Ready,
    log_channel_id: ChannelId,
    command_count: usize,
) {
    let log_channel = match ctx.http.get_channel(log_channel_id.0).await {
        Ok(Channel::Guild(channel))
            if matches!(channel.kind, ChannelType::Text | ChannelType::News) =>
        {
            channel
        }
        Ok(_) => {
            warn!(
                "Startup log channel {} is not a text channel, skipping banner",
                log_channel_id
            );
            return;
        }
        Err(error) => {
            warn!("Startup log channel {} not found: {}", log_channel_id, error);
            return;
        }
    };

    let now = chrono::Utc::now();
    let bot_stats = [
        format!("**Version:** {}", env!("CARGO_PKG_VERSION")),
        format!("**Servers:** {}", ready.guilds.len()),
        format!("**Commands:** {}", command_count),
    ]
    .join("\n");

    let result = log_channel
        .send_message(&ctx.http, |message| {
            message.embed(|embed| {
                embed
                    .title(format!("🚀 {} is Online!", ready.user.name))
                    .description(format!(
                        "Bot successfully started at <t:{}:F>",
                        now.timestamp()
                    ))
                    .field("🤖 Bot Stats", bot_stats, true)
                    .color(EMBED_COLOR)
                    .footer(|footer| {
                        footer.text(format!(
                            "Bot ID: {} • {}",
                            ready.user.id,
                            now.format("%Y-%m-%d %H:%M:%S UTC")
                        ))
                    })
                    .timestamp(Timestamp::now())
            })
        })
        .await;

    if let Err(error) = result {
        error!("Failed to send startup banner: {}", error);
    }
}
