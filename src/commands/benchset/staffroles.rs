use serenity::all::Mentionable;
use tracing::info;

use crate::{benchdb, BenchContext, Error};
use crate::commands::GUILD_ONLY;
use crate::error::BenchError;
use crate::util::field_list;
use super::{role_argument, roles_in_guild};

#[poise::command(prefix_command, slash_command,
    subcommands("add", "remove", "list"),
    guild_only,
    required_permissions = "ADMINISTRATOR",
    description_localized("en-US", "Manage the roles allowed to review benchmarks.")
)]
pub async fn staffroles(ctx: BenchContext<'_>) -> Result<(), Error> {
    ctx.say("⚠️ Please specify an action: `add`, `remove` or `list`.").await?;
    Ok(())
}

#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR",
    description_localized("en-US", "Add a staff role.")
)]
pub async fn add(
    ctx: BenchContext<'_>,
    #[description = "A role mention or id"] role: Option<String>
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(GUILD_ONLY).await?;
        return Ok(());
    };

    let role_id = role_argument(role.as_deref(), "Please mention a role to add.")?;
    if roles_in_guild(&ctx, &[role_id]).is_empty() {
        return Err(BenchError::Malformed("That role doesn't exist in this server.".to_string()).into());
    }

    let db = benchdb!(ctx);
    let content = if db.add_staff_role(guild_id, role_id)? {
        info!("{} added staff role {} in guild {}", ctx.author().id, role_id, guild_id);
        format!("✅ {} has been added to the staff roles.", role_id.mention())
    } else {
        format!("⚠️ {} is already a staff role.", role_id.mention())
    };

    ctx.say(content).await?;
    Ok(())
}

#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR",
    description_localized("en-US", "Remove a staff role.")
)]
pub async fn remove(
    ctx: BenchContext<'_>,
    #[description = "A role mention or id"] role: Option<String>
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(GUILD_ONLY).await?;
        return Ok(());
    };

    // Deleted roles can still be unregistered, so no guild lookup here.
    let role_id = role_argument(role.as_deref(), "Please mention a role to remove.")?;

    let db = benchdb!(ctx);
    let content = if db.remove_staff_role(guild_id, role_id)? {
        info!("{} removed staff role {} in guild {}", ctx.author().id, role_id, guild_id);
        format!("✅ {} has been removed from the staff roles.", role_id.mention())
    } else {
        format!("⚠️ {} is not a staff role.", role_id.mention())
    };

    ctx.say(content).await?;
    Ok(())
}

#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR",
    description_localized("en-US", "List the staff roles.")
)]
pub async fn list(ctx: BenchContext<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(GUILD_ONLY).await?;
        return Ok(());
    };

    let db = benchdb!(ctx);
    let roles = roles_in_guild(&ctx, &db.get_staff_roles(guild_id)?);
    let lines = roles.into_iter().map(|role| role.mention().to_string());

    ctx.say(format!("📜 Staff roles:\n{}", field_list(lines, "None"))).await?;
    Ok(())
}
