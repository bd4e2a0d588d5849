mod commands;
mod config;
mod startup;
mod tracker;
mod welcome;

use std::env;
use std::sync::Arc;
use std::time::Duration;

use dotenv::dotenv;
use log::{error, info, warn};
use serenity::async_trait;
use serenity::model::application::interaction::{Interaction, InteractionResponseType};
use serenity::model::gateway::Ready;
use serenity::model::prelude::*;
use serenity::prelude::*;

use config::BotConfig;
use tracker::CategoryTracker;

struct Bot {
    config: Arc<BotConfig>,
    tracker: CategoryTracker,
}

#[async_trait]
impl EventHandler for Bot {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);

        let commands =
            GuildId::set_application_commands(&self.config.guild_id, &ctx.http, |commands| {
                commands.create_application_command(|command| commands::service::register(command))
            })
            .await;

        let command_count = match commands {
            Ok(commands) => {
                info!("Guild commands created");
                commands.len()
            }
            Err(error) => {
                error!("Error while creating commands: {}", error);
                0
            }
        };

        startup::post_startup_banner(&ctx, &ready, self.config.startup_log_channel_id, command_count)
            .await;

        // Give the gateway a moment to deliver the guild's channels before
        // the first refresh.
        tokio::time::sleep(Duration::from_millis(3000)).await;
        self.tracker.refresh_all(&ctx, self.config.guild_id).await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::ApplicationCommand(command) = interaction {
            match command.data.name.as_str() {
                "service" => commands::service::run(&ctx, &command, &self.config).await,
                other => {
                    warn!("No command matching {} was found", other);
                    if let Err(why) = command
                        .create_interaction_response(&ctx.http, |response| {
                            response
                                .kind(InteractionResponseType::ChannelMessageWithSource)
                                .interaction_response_data(|message| {
                                    message.content("not implemented :(").ephemeral(true)
                                })
                        })
                        .await
                    {
                        error!("Cannot respond to slash command: {}", why);
                    }
                }
            }
        }
    }

    async fn channel_create(&self, ctx: Context, channel: &GuildChannel) {
        if channel.guild_id != self.config.guild_id {
            return;
        }

        if channel.parent_id == Some(self.config.welcome_category_id) {
            let greet_ctx = ctx.clone();
            let new_channel = channel.clone();
            tokio::spawn(async move {
                welcome::greet_new_channel(&greet_ctx, &new_channel).await;
            });
        }

        if self.tracker.is_tracked_parent(channel.parent_id) {
            self.tracker.refresh_all(&ctx, channel.guild_id).await;
        }
    }

    async fn channel_delete(&self, ctx: Context, channel: &GuildChannel) {
        if channel.guild_id != self.config.guild_id {
            return;
        }

        if self.tracker.is_tracked_parent(channel.parent_id) {
            self.tracker.refresh_all(&ctx, channel.guild_id).await;
        }
    }

    async fn channel_update(&self, ctx: Context, old: Option<Channel>, new: Channel) {
        let Channel::Guild(new) = new else { return };
        if new.guild_id != self.config.guild_id {
            return;
        }

        let old_parent = old.and_then(|channel| match channel {
            Channel::Guild(channel) => channel.parent_id,
            _ => None,
        });

        if self
            .tracker
            .parent_change_is_relevant(old_parent, new.parent_id)
        {
            self.tracker.refresh_all(&ctx, new.guild_id).await;
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file
    dotenv().ok();
    env_logger::init();

    // Configure the client with your Discord bot token in the environment.
    let token = env::var("DISCORD_TOKEN").expect("Expected a token in the environment");
    let config = Arc::new(BotConfig::from_env());

    let bot = Bot {
        tracker: CategoryTracker::new(config.clone()),
        config,
    };

    // Channel lifecycle events and interactions both arrive with GUILDS.
    let intents = GatewayIntents::GUILDS;

    let mut client = Client::builder(token, intents)
        .event_handler(bot)
        .await
        .expect("Error creating client");

    // Finally, start a single shard, and start listening to events.
    //
    // Shards will automatically attempt to reconnect, and will perform
    // exponential backoff until it reconnects.
    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }
}
