use poise::CreateReply;
use serenity::all::{Colour, CreateEmbed};

use crate::{benchdb, BenchContext, Error};
use crate::commands::GUILD_ONLY;
use crate::services::directory::label_submissions;

const LEADERBOARD_SIZE: u32 = 5;

#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    description_localized("en-US", "Show the top verified GPU benchmark scores.")
)]
pub async fn benchtop(ctx: BenchContext<'_>) -> Result<(), Error> {
    if ctx.guild_id().is_none() {
        ctx.say(GUILD_ONLY).await?;
        return Ok(());
    }

    let db = benchdb!(ctx);
    let top = db.top_submissions(LEADERBOARD_SIZE)?;

    if top.is_empty() {
        ctx.say("No verified benchmark scores yet.").await?;
        return Ok(());
    }

    let labeled = label_submissions(ctx.http(), top).await;

    let embed = labeled.iter().enumerate().fold(
        CreateEmbed::new().title(format!("🏆 Top {LEADERBOARD_SIZE} GPU Benchmarks")).colour(Colour::DARK_GREEN),
        |embed, (index, entry)| embed.field(
            format!("{}. {}", index + 1, entry.name),
            format!("{}: {} points", entry.submission.gpu_model, entry.submission.score),
            false
        )
    );

    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}
