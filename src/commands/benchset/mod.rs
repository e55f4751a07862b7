mod bench_config;
mod staffroles;
mod gpumodels;

use bench_config::*;
use staffroles::staffroles;
use gpumodels::gpumodels;

use serenity::model::id::RoleId;

use crate::{BenchContext, Error};
use crate::error::BenchError;
use crate::util::parse_role_ref;

#[poise::command(prefix_command, slash_command,
    subcommands("show", "logchannel", "logchanneltoggle", "staffroles", "gpumodels"),
    guild_only,
    required_permissions = "ADMINISTRATOR",
    description_localized("en-US", "Manage benchmark settings, staff roles and GPU models."),
    identifying_name = "Benchmark Settings"
)]
pub async fn benchset(
    ctx: BenchContext<'_>,
    #[description = "Subcommand"] #[rest] unknown: Option<String>
) -> Result<(), Error> {
    match unknown_subcommand_reply(unknown.as_deref()) {
        Some(reply) => {
            ctx.say(reply).await?;
            Ok(())
        }
        None => show_settings(ctx).await
    }
}

const SUBCOMMANDS: [&str; 5] = ["show", "logchannel", "logchanneltoggle", "staffroles", "gpumodels"];

/// Trailing input that didn't match a subcommand gets the list of valid ones instead of the settings embed.
fn unknown_subcommand_reply(input: Option<&str>) -> Option<String> {
    let input = input.map(str::trim).filter(|input| !input.is_empty())?;
    let name = input.split_whitespace().next().unwrap_or(input);

    let valid = SUBCOMMANDS.iter().map(|sub| format!("`{sub}`")).collect::<Vec<_>>().join(", ");
    Some(format!("⚠️ Unknown subcommand `{name}`. Available subcommands: {valid}."))
}

/// Drops roles that no longer exist in the guild, as far as the cache knows.
fn roles_in_guild(ctx: &BenchContext<'_>, roles: &[RoleId]) -> Vec<RoleId> {
    match ctx.guild() {
        Some(guild) => roles.iter().copied().filter(|role| guild.roles.contains_key(role)).collect(),
        None => roles.to_vec()
    }
}

fn role_argument(input: Option<&str>, missing: &str) -> Result<RoleId, BenchError> {
    let Some(input) = input else {
        return Err(BenchError::Malformed(missing.to_string()));
    };

    parse_role_ref(input).ok_or_else(|| BenchError::Malformed("Invalid role. Please mention a role or give its id.".to_string()))
}
