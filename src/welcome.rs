//! Welcome embed for freshly created service-request channels.

use std::time::Duration;

use log::{error, info};
use rand::Rng;
use serenity::model::prelude::*;
use serenity::prelude::*;

const EMBED_COLOR: u32 = 0x8000ff;

/// Posts the welcome embed into a new channel after a short delay, so the
/// message lands after the ticket tool has finished setting the channel up.
/// Voice and stage channels cannot receive messages and are skipped.
pub async fn greet_new_channel(ctx: &Context, channel: &GuildChannel) {
    if channel.kind == ChannelType::Category {
        return;
    }
    if !matches!(channel.kind, ChannelType::Text | ChannelType::News) {
        info!(
            "Skipping #{}: channel type {:?} does not support messages",
            channel.name, channel.kind
        );
        return;
    }

    let delay_ms = rand::thread_rng().gen_range(1000..2000);
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;

    let result = channel
        .send_message(&ctx.http, |message| {
            message.embed(|embed| {
                embed
                    .description(
                        "## Thanks for opening a Service Request!\n\
                         At this time, please write which service and any details about it. \
                         Our staff will be with you momentarily.",
                    )
                    .color(EMBED_COLOR)
            })
        })
        .await;

    match result {
        Ok(_) => info!("Sent welcome message to new channel #{}", channel.name),
        Err(error) => error!(
            "Failed to send welcome message to #{}: {}",
            channel.name, error
        ),
    }
}
