mod general;
mod bench;
mod benchset;

use serenity::model::id::{GuildId, RoleId};
use tracing::{error, warn};

use crate::{benchdb, BenchContext, Data, Error};
use crate::error::BenchError;
use crate::services::permissions::require_staff;

pub const GUILD_ONLY: &str = "This command can only be run in a server.";

#[poise::command(prefix_command, track_edits, slash_command)]
async fn help(
    ctx: BenchContext<'_>,
    #[description = "The command requested for help"]
    #[autocomplete = "poise::builtins::autocomplete_command"]
    command: Option<String>,
) -> Result<(), Error> {
    poise::builtins::help(
        ctx,
        command.as_deref(),
        poise::builtins::HelpConfiguration {
            extra_text_at_bottom: "Submit with `bench`, then reply with your score once you've picked a GPU.",
            show_context_menu_commands: true,
            ..Default::default()
        },
    )
        .await?;
    Ok(())
}

/// Fails with `PermissionDenied` unless the author is staff in `guild_id`.
pub async fn staff_gate(ctx: &BenchContext<'_>, guild_id: GuildId) -> Result<(), Error> {
    let roles: Vec<RoleId> = match ctx.author_member().await {
        Some(member) => member.roles.clone(),
        None => Vec::new()
    };

    let db = benchdb!(ctx);
    require_staff(&db, guild_id, ctx.author().id, &roles)?;

    Ok(())
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            let reply = match error.downcast_ref::<BenchError>().and_then(BenchError::user_message) {
                Some(message) => message,
                None => {
                    error!("Command {} failed (invocation {}): {}", ctx.command().qualified_name, ctx.id(), error);
                    "Something went wrong while running that command, sorry!".to_string()
                }
            };

            if let Err(ex) = ctx.say(reply).await {
                error!("Failed to send error message: {}", ex);
            }
        }
        other => {
            if let Err(ex) = poise::builtins::on_error(other).await {
                warn!("Failed to handle framework error: {}", ex);
            }
        }
    }
}

pub fn get_framework(pref: &str) -> poise::FrameworkOptions<Data, Error> {
    poise::FrameworkOptions {
        commands: vec![
            help(),
            general::info(),
            general::register(),
            bench::bench(),
            bench::benchu(),
            bench::benchverify(),
            bench::rembench(),
            bench::benchcheck(),
            bench::benchtop(),
            benchset::benchset()
        ],
        prefix_options: poise::PrefixFrameworkOptions {
            prefix: Some(pref.to_string()),
            mention_as_prefix: true,
            ..Default::default()
        },
        on_error: |error| Box::pin(on_error(error)),
        ..Default::default()
    }
}
