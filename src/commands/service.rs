//! Staff-facing `/service` ticket workflow commands.

use log::{error, warn};
use serenity::builder;
use serenity::model::prelude::command::CommandOptionType;
use serenity::model::prelude::interaction::application_command::{
    ApplicationCommandInteraction, CommandDataOption, CommandDataOptionValue,
};
use serenity::model::prelude::interaction::InteractionResponseType;
use serenity::model::prelude::*;
use serenity::prelude::*;

use crate::config::BotConfig;

const EMBED_COLOR: u32 = 0x8000ff;

pub fn register(
    command: &mut builder::CreateApplicationCommand,
) -> &mut builder::CreateApplicationCommand {
    command
        .name("service")
        .description("Service management commands")
        .create_option(|option| {
            option
                .name("claim")
                .description("Claim a service ticket")
                .kind(CommandOptionType::SubCommand)
        })
        .create_option(|option| {
            option
                .name("transfer")
                .description("Transfer a service ticket")
                .kind(CommandOptionType::SubCommand)
        })
        .create_option(|option| {
            option
                .name("completed")
                .description("Mark a service as completed")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(|option| {
                    option
                        .name("type")
                        .description("Type of service")
                        .kind(CommandOptionType::String)
                        .required(true)
                        .add_string_choice("Paid", "paid")
                        .add_string_choice("Free", "free")
                })
                .create_sub_option(|option| {
                    option
                        .name("user")
                        .description("The user to give the role to")
                        .kind(CommandOptionType::User)
                        .required(true)
                })
        })
}

pub async fn run(ctx: &Context, command: &ApplicationCommandInteraction, config: &BotConfig) {
    let Some(subcommand) = command.data.options.get(0) else {
        respond_text(ctx, command, "Missing subcommand.", true).await;
        return;
    };

    match subcommand.name.as_str() {
        "claim" => {
            let content = format!(
                "Thanks for choosing **mage market**! I am {} and I'll be assisting you today.",
                command.user.mention()
            );
            respond_text(ctx, command, &content, false).await;
        }
        "transfer" => {
            respond_text(
                ctx,
                command,
                "This ticket is currently being transferred to a different person/department. Please remain patient.",
                false,
            )
            .await;
        }
        "completed" => run_completed(ctx, command, config, &subcommand.options).await,
        other => {
            warn!("Unknown /service subcommand: {}", other);
            respond_text(ctx, command, "not implemented :(", true).await;
        }
    }
}

async fn run_completed(
    ctx: &Context,
    command: &ApplicationCommandInteraction,
    config: &BotConfig,
    options: &[CommandDataOption],
) {
    let mut service_type = None;
    let mut target_user = None;
    for option in options {
        match (option.name.as_str(), option.resolved.as_ref()) {
            ("type", Some(CommandDataOptionValue::String(value))) => {
                service_type = Some(value.clone());
            }
            ("user", Some(CommandDataOptionValue::User(user, _))) => {
                target_user = Some(user.clone());
            }
            _ => {}
        }
    }

    let (Some(service_type), Some(target_user)) = (service_type, target_user) else {
        respond_text(ctx, command, "Both type and user are required.", true).await;
        return;
    };

    let Some(guild_id) = command.guild_id else {
        respond_text(ctx, command, "This command can only be used in a server.", true).await;
        return;
    };

    let role_id = if service_type == "paid" {
        config.paid_client_role_id
    } else {
        config.free_client_role_id
    };

    let mut member = match guild_id.member(ctx, target_user.id).await {
        Ok(member) => member,
        Err(error) => {
            warn!(
                "Could not fetch member {} for /service completed: {}",
                target_user.id, error
            );
            respond_text(ctx, command, "User not found in this server.", true).await;
            return;
        }
    };

    if let Err(error) = member.add_role(&ctx.http, role_id).await {
        error!(
            "Failed to assign role {} to {}: {}",
            role_id, target_user.id, error
        );
        respond_text(
            ctx,
            command,
            "There was an error completing the service. Please check the bot permissions.",
            true,
        )
        .await;
        return;
    }

    respond_embed(
        ctx,
        command,
        "Thank you for choosing **mage market**! You have now been given your client role. Please make sure to check your dms.",
    )
    .await;
}

async fn respond_text(
    ctx: &Context,
    command: &ApplicationCommandInteraction,
    content: &str,
    ephemeral: bool,
) {
    if let Err(why) = command
        .create_interaction_response(&ctx.http, |response| {
            response
                .kind(InteractionResponseType::ChannelMessageWithSource)
                .interaction_response_data(|message| message.content(content).ephemeral(ephemeral))
        })
        .await
    {
        error!("Cannot respond to slash command: {}", why);
    }
}

async fn respond_embed(ctx: &Context, command: &ApplicationCommandInteraction, description: &str) {
    if let Err(why) = command
        .create_interaction_response(&ctx.http, |response| {
            response
                .kind(InteractionResponseType::ChannelMessageWithSource)
                .interaction_response_data(|message| {
                    message.embed(|embed| embed.description(description).color(EMBED_COLOR))
                })
        })
        .await
    {
        error!("Cannot respond to slash command: {}", why);
    }
}
