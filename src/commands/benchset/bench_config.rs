use poise::CreateReply;
use serenity::all::{ChannelType, Colour, CreateEmbed, Mentionable};
use serenity::model::id::ChannelId;
use tracing::info;

use crate::{benchdb, BenchContext, Error};
use crate::commands::{staff_gate, GUILD_ONLY};
use crate::error::BenchError;
use crate::models::bench_db_models::LogChannelToggle;
use crate::util::{field_list, parse_channel_ref};
use super::roles_in_guild;

pub async fn show_settings(ctx: BenchContext<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(GUILD_ONLY).await?;
        return Ok(());
    };

    let db = benchdb!(ctx);
    let settings = db.get_bench_settings(guild_id)?;

    let log_channel = settings.log_channel
        .map(|channel| channel.mention().to_string())
        .unwrap_or_else(|| "Not set".to_string());
    let staff_roles = roles_in_guild(&ctx, &settings.staff_roles)
        .into_iter()
        .map(|role| role.mention().to_string());

    let embed = CreateEmbed::new()
        .title("⚙️ GPU Bench Settings")
        .colour(Colour::BLUE)
        .field("Log Channel", log_channel, false)
        .field("Staff Roles", field_list(staff_roles, "None"), false)
        .field("Available GPU Models", field_list(settings.gpu_models, "None"), false);

    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR",
    description_localized("en-US", "Show the current benchmark settings.")
)]
pub async fn show(ctx: BenchContext<'_>) -> Result<(), Error> {
    show_settings(ctx).await
}

fn is_text_channel(ctx: &BenchContext<'_>, channel_id: ChannelId) -> bool {
    ctx.guild()
        .and_then(|guild| guild.channels.get(&channel_id).map(|channel| matches!(channel.kind, ChannelType::Text | ChannelType::News)))
        .unwrap_or(false)
}

#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR",
    description_localized("en-US", "Set the channel new benchmark submissions are posted to.")
)]
pub async fn logchannel(
    ctx: BenchContext<'_>,
    #[description = "A channel mention or id"] channel: Option<String>
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(GUILD_ONLY).await?;
        return Ok(());
    };

    let Some(input) = channel else {
        return Err(BenchError::Malformed("Please mention a channel to set as the log channel.".to_string()).into());
    };

    let Some(channel_id) = parse_channel_ref(&input).filter(|id| is_text_channel(&ctx, *id)) else {
        return Err(BenchError::Malformed("Invalid channel. Please mention a valid text channel.".to_string()).into());
    };

    staff_gate(&ctx, guild_id).await?;

    let db = benchdb!(ctx);
    db.set_log_channel(guild_id, channel_id)?;

    info!("{} set the benchmark log channel of guild {} to {}", ctx.author().id, guild_id, channel_id);
    ctx.say(format!("✅ Benchmark log channel set to {}.", channel_id.mention())).await?;
    Ok(())
}

#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR",
    description_localized("en-US", "Turn submission logging on for this channel, or off.")
)]
pub async fn logchanneltoggle(ctx: BenchContext<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(GUILD_ONLY).await?;
        return Ok(());
    };

    staff_gate(&ctx, guild_id).await?;

    let db = benchdb!(ctx);
    let content = match db.toggle_log_channel(guild_id, ctx.channel_id())? {
        LogChannelToggle::Enabled(channel) => {
            info!("{} enabled benchmark logging in {}", ctx.author().id, channel);
            format!("✅ Logging has been enabled for {}.", channel.mention())
        }
        LogChannelToggle::Disabled(channel) => {
            info!("{} disabled benchmark logging (was {})", ctx.author().id, channel);
            "✅ Logging has been disabled.".to_string()
        }
    };

    ctx.say(content).await?;
    Ok(())
}
