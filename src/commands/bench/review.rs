use poise::CreateReply;
use serenity::all::{Colour, CreateEmbed, Mentionable};
use serenity::model::{id::UserId, user::User};
use tracing::info;

use crate::{benchdb, BenchContext, Error};
use crate::commands::{staff_gate, GUILD_ONLY};
use crate::error::BenchError;
use crate::services::directory::label_submissions;

// Discord allows at most 25 fields per embed.
const MAX_EMBED_FIELDS: usize = 25;

fn verified_message(user_id: UserId, score: i64) -> String {
    format!("✅ {}'s GPU benchmark score of {} has been verified.", user_id.mention(), score)
}

#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    description_localized("en-US", "Verify a user's GPU benchmark so it shows on the leaderboard.")
)]
pub async fn benchverify(
    ctx: BenchContext<'_>,
    #[description = "The user whose benchmark to verify"] user: User
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(GUILD_ONLY).await?;
        return Ok(());
    };

    staff_gate(&ctx, guild_id).await?;

    let db = benchdb!(ctx);
    let Some(submission) = db.verify_submission(user.id)? else {
        return Err(BenchError::NotFound(user.id).into());
    };

    info!("{} verified the benchmark of {} ({} on {})", ctx.author().id, user.id, submission.score, submission.gpu_model);
    ctx.say(verified_message(user.id, submission.score)).await?;

    Ok(())
}

#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    description_localized("en-US", "Remove a user's GPU benchmark submission.")
)]
pub async fn rembench(
    ctx: BenchContext<'_>,
    #[description = "The user whose benchmark to remove"] user: User
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(GUILD_ONLY).await?;
        return Ok(());
    };

    staff_gate(&ctx, guild_id).await?;

    let db = benchdb!(ctx);
    if !db.remove_submission(user.id)? {
        return Err(BenchError::NotFound(user.id).into());
    }

    info!("{} removed the benchmark of {}", ctx.author().id, user.id);
    ctx.say(format!("🗑️ {}'s benchmark has been removed.", user.mention())).await?;

    Ok(())
}

#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    description_localized("en-US", "List the GPU benchmarks waiting for verification.")
)]
pub async fn benchcheck(ctx: BenchContext<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(GUILD_ONLY).await?;
        return Ok(());
    };

    staff_gate(&ctx, guild_id).await?;

    let db = benchdb!(ctx);
    let pending = db.pending_submissions()?;

    if pending.is_empty() {
        ctx.say("✅ There are no pending benchmark verifications.").await?;
        return Ok(());
    }

    let labeled = label_submissions(ctx.http(), pending).await;

    for (page, chunk) in labeled.chunks(MAX_EMBED_FIELDS).enumerate() {
        let title = if page == 0 {
            "⏳ Unverified GPU Benchmarks"
        } else {
            "⏳ Unverified GPU Benchmarks (continued)"
        };

        let embed = chunk.iter().fold(CreateEmbed::new().title(title).colour(Colour::ORANGE), |embed, entry| {
            let submission = &entry.submission;
            embed.field(
                &entry.name,
                format!("User: {}\nGPU: {}\nScore: {}", submission.user_id.mention(), submission.gpu_model, submission.score),
                false
            )
        });

        ctx.send(CreateReply::default().embed(embed)).await?;
    }

    Ok(())
}
