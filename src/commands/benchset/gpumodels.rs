use tracing::info;

use crate::{benchdb, BenchContext, Error};
use crate::util::{field_list, validate_model_name};

#[poise::command(prefix_command, slash_command,
    subcommands("add", "remove", "list"),
    guild_only,
    required_permissions = "ADMINISTRATOR",
    description_localized("en-US", "Manage the GPU models offered when submitting.")
)]
pub async fn gpumodels(ctx: BenchContext<'_>) -> Result<(), Error> {
    ctx.say("⚠️ Please specify an action: `add`, `remove` or `list`.").await?;
    Ok(())
}

#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR",
    description_localized("en-US", "Add a GPU model to the catalog.")
)]
pub async fn add(
    ctx: BenchContext<'_>,
    #[description = "The GPU model name"] #[rest] model: Option<String>
) -> Result<(), Error> {
    let model = validate_model_name(model.as_deref().unwrap_or_default())?;

    let db = benchdb!(ctx);
    let content = if db.add_gpu_model(model)? {
        info!("{} added GPU model {:?}", ctx.author().id, model);
        format!("✅ `{model}` has been added to the GPU models.")
    } else {
        format!("⚠️ `{model}` is already in the GPU models.")
    };

    ctx.say(content).await?;
    Ok(())
}

#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR",
    description_localized("en-US", "Remove a GPU model from the catalog.")
)]
pub async fn remove(
    ctx: BenchContext<'_>,
    #[description = "The GPU model name"] #[rest] model: Option<String>
) -> Result<(), Error> {
    let model = validate_model_name(model.as_deref().unwrap_or_default())?;

    let db = benchdb!(ctx);
    let content = if db.remove_gpu_model(model)? {
        info!("{} removed GPU model {:?}", ctx.author().id, model);
        format!("✅ `{model}` has been removed from the GPU models.")
    } else {
        format!("⚠️ `{model}` is not in the GPU models.")
    };

    ctx.say(content).await?;
    Ok(())
}

#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR",
    description_localized("en-US", "List the GPU models in the catalog.")
)]
pub async fn list(ctx: BenchContext<'_>) -> Result<(), Error> {
    let db = benchdb!(ctx);
    let models = db.get_gpu_models()?;

    ctx.say(format!("📜 GPU models:\n{}", field_list(models, "None"))).await?;
    Ok(())
}
