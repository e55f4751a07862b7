mod submit;
mod review;
mod leaderboard;

pub use submit::*;
pub use review::*;
pub use leaderboard::*;

use serenity::all::{Colour, CreateEmbed, CreateEmbedFooter, CreateMessage, Mentionable};
use serenity::client::Context;
use serenity::model::id::GuildId;

use crate::Error;
use crate::models::bench_db_models::Submission;
use crate::services::database::Database;

/// Posts a new submission to the guild's log channel, if it has one.
pub async fn log_submission(ctx: &Context, db: &Database, guild_id: GuildId, submission: &Submission) -> Result<(), Error> {
    let Some(channel) = db.get_log_channel(guild_id)? else {
        return Ok(());
    };

    let embed = CreateEmbed::new()
        .title("📥 New Benchmark Submission")
        .colour(Colour::ORANGE)
        .field("User", submission.user_id.mention().to_string(), true)
        .field("GPU", &submission.gpu_model, true)
        .field("Score", submission.score.to_string(), true)
        .footer(CreateEmbedFooter::new(format!("Submitted {}", submission.submitted_at.format("%Y-%m-%d %H:%M UTC"))));

    channel.send_message(ctx, CreateMessage::new().embed(embed)).await?;
    Ok(())
}
