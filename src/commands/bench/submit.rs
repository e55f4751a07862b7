use std::sync::Arc;
use async_trait::async_trait;
use poise::CreateReply;
use serenity::all::{
    ButtonStyle, Colour, ComponentInteraction, ComponentInteractionDataKind, CreateActionRow, CreateButton, CreateEmbed,
    CreateInteractionResponse, CreateInteractionResponseMessage, CreateSelectMenu, CreateSelectMenuKind,
    CreateSelectMenuOption, EditMessage, Mentionable
};
use serenity::client::Context;
use serenity::collector::{ComponentInteractionCollector, MessageCollector};
use serenity::futures::StreamExt;
use serenity::model::{
    channel::Message,
    id::{GuildId, MessageId, UserId},
    user::User
};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::{benchdb, BenchContext, Error};
use crate::commands::{staff_gate, GUILD_ONLY};
use crate::error::BenchError;
use crate::models::bench_db_models::Submission;
use crate::services::database::Database;
use crate::services::workflow::{
    Envelope, Outcome, SubmissionUi, TimeoutStage, Workflow, WorkflowEvent, WorkflowId,
    run_workflow, SCORE_REPLY_TIMEOUT, SELECTION_TIMEOUT
};
use super::log_submission;

// Discord caps a select menu at 25 options.
const MAX_SELECT_OPTIONS: usize = 25;
const EVENT_BUFFER: usize = 16;

const SELECT_ID: &str = "gpu";
const CANCEL_ID: &str = "cancel";

#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    description_localized("en-US", "Submit your GPU benchmark score.")
)]
pub async fn bench(ctx: BenchContext<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(GUILD_ONLY).await?;
        return Ok(());
    };

    start_submission(ctx, guild_id, None).await
}

#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    description_localized("en-US", "Submit a GPU benchmark score on behalf of another user.")
)]
pub async fn benchu(
    ctx: BenchContext<'_>,
    #[description = "The user to submit a score for"] user: User
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(GUILD_ONLY).await?;
        return Ok(());
    };

    staff_gate(&ctx, guild_id).await?;
    start_submission(ctx, guild_id, Some(user)).await
}

async fn start_submission(ctx: BenchContext<'_>, guild_id: GuildId, target: Option<User>) -> Result<(), Error> {
    let db = benchdb!(ctx);

    let mut catalog = db.get_gpu_models()?;
    if catalog.len() > MAX_SELECT_OPTIONS {
        warn!("GPU catalog has {} models, only the first {} are offered", catalog.len(), MAX_SELECT_OPTIONS);
        catalog.truncate(MAX_SELECT_OPTIONS);
    }

    let invoker = ctx.author().id;
    let workflow = Workflow::start(ctx.id(), guild_id, invoker, target.as_ref().map(|u| u.id), catalog, Instant::now())?;
    let correlation = workflow.id();

    let embed = match &target {
        Some(user) => CreateEmbed::new()
            .title(":desktop: GPU Benchmark Submission for Another User")
            .description(format!("Select the **GPU model** {} benchmarked from the dropdown below.", user.mention())),
        None => CreateEmbed::new()
            .title(":desktop: GPU Benchmark Submission")
            .description("Select your **GPU model** from the dropdown below.")
    }.colour(Colour::BLUE);

    let reply = CreateReply::default()
        .embed(embed)
        .components(prompt_components(correlation, workflow.catalog()));
    let prompt = ctx.send(reply).await?.into_message().await?;

    let (sender, receiver) = mpsc::channel(EVENT_BUFFER);
    let pump = tokio::spawn(pump_events(ctx.serenity_context().clone(), correlation, prompt.id, invoker, sender));

    let mut ui = DiscordSubmissionUi {
        ctx: ctx.serenity_context().clone(),
        db: db.clone(),
        guild_id,
        correlation,
        prompt
    };

    let outcome = run_workflow(workflow, receiver, &db, &mut ui).await;
    pump.abort();

    match outcome? {
        Outcome::Committed(submission) => debug!("Submission {} finished with a score of {}", correlation, submission.score),
        Outcome::Canceled => debug!("Submission {} was canceled", correlation),
        Outcome::TimedOut(stage) => debug!("Submission {} timed out at {:?}", correlation, stage)
    }

    Ok(())
}

fn custom_id(correlation: WorkflowId, part: &str) -> String {
    format!("{correlation}:{part}")
}

fn cancel_row(correlation: WorkflowId) -> CreateActionRow {
    CreateActionRow::Buttons(vec![
        CreateButton::new(custom_id(correlation, CANCEL_ID))
            .label("Cancel")
            .style(ButtonStyle::Danger)
    ])
}

fn prompt_components(correlation: WorkflowId, catalog: &[String]) -> Vec<CreateActionRow> {
    let options = catalog.iter()
        .map(|model| CreateSelectMenuOption::new(model, model))
        .collect();

    let menu = CreateSelectMenu::new(custom_id(correlation, SELECT_ID), CreateSelectMenuKind::String { options })
        .placeholder("Choose your GPU");

    vec![CreateActionRow::SelectMenu(menu), cancel_row(correlation)]
}

/// Maps a tagged component id plus the picked value, if any, to a workflow event.
fn component_event(custom_id: &str, actor: UserId, selected: Option<&str>) -> Option<WorkflowEvent> {
    let (_, part) = custom_id.split_once(':')?;

    match (part, selected) {
        (CANCEL_ID, _) => Some(WorkflowEvent::Cancel { actor }),
        (SELECT_ID, Some(model)) => Some(WorkflowEvent::Select { actor, model: model.to_string() }),
        _ => None
    }
}

fn interaction_event(interaction: &ComponentInteraction) -> Option<WorkflowEvent> {
    let selected = match &interaction.data.kind {
        ComponentInteractionDataKind::StringSelect { values } => values.first().map(String::as_str),
        _ => None
    };

    component_event(&interaction.data.custom_id, interaction.user.id, selected)
}

/// Forwards prompt interactions and the invoker's messages to the workflow until it hangs up.
async fn pump_events(
    ctx: Context,
    correlation: WorkflowId,
    prompt_id: MessageId,
    invoker: UserId,
    sender: mpsc::Sender<Envelope<Option<ComponentInteraction>>>
) {
    let lifetime = SELECTION_TIMEOUT + SCORE_REPLY_TIMEOUT;
    let prefix = custom_id(correlation, "");

    let mut components = Box::pin(ComponentInteractionCollector::new(&ctx)
        .message_id(prompt_id)
        .filter(move |interaction| interaction.data.custom_id.starts_with(&prefix))
        .timeout(lifetime)
        .stream());

    let mut replies = Box::pin(MessageCollector::new(&ctx)
        .author_id(invoker)
        .timeout(lifetime)
        .stream());

    loop {
        let envelope = tokio::select! {
            Some(interaction) = components.next() => {
                let Some(event) = interaction_event(&interaction) else {
                    continue;
                };

                Envelope { correlation, event, responder: Some(interaction) }
            }
            Some(message) = replies.next() => Envelope {
                correlation,
                event: WorkflowEvent::Reply { actor: message.author.id, content: message.content },
                responder: None
            },
            else => break
        };

        if sender.send(envelope).await.is_err() {
            break;
        }
    }
}

struct DiscordSubmissionUi {
    ctx: Context,
    db: Arc<Database>,
    guild_id: GuildId,
    correlation: WorkflowId,
    prompt: Message
}

impl DiscordSubmissionUi {
    async fn respond_ephemeral(&self, interaction: &ComponentInteraction, content: impl Into<String>) -> Result<(), Error> {
        let message = CreateInteractionResponseMessage::new()
            .content(content)
            .ephemeral(true);

        interaction.create_response(&self.ctx, CreateInteractionResponse::Message(message)).await?;
        Ok(())
    }

    async fn set_components(&mut self, components: Vec<CreateActionRow>) {
        if let Err(ex) = self.prompt.edit(&self.ctx, EditMessage::new().components(components)).await {
            warn!("Failed to update submission prompt {}: {}", self.prompt.id, ex);
        }
    }

    async fn say(&self, content: impl Into<String>) -> Result<(), Error> {
        self.prompt.channel_id.say(&self.ctx, content).await?;
        Ok(())
    }
}

#[async_trait]
impl SubmissionUi for DiscordSubmissionUi {
    type Responder = Option<ComponentInteraction>;

    async fn not_yours(&mut self, responder: Self::Responder) -> Result<(), Error> {
        if let Some(interaction) = responder {
            self.respond_ephemeral(&interaction, "This is not your submission process.").await?;
        }

        Ok(())
    }

    async fn model_selected(&mut self, responder: Self::Responder, model: &str, target: UserId, self_submission: bool) -> Result<(), Error> {
        let whom = if self_submission {
            "your GPU".to_string()
        } else {
            target.mention().to_string()
        };

        if let Some(interaction) = responder {
            self.respond_ephemeral(&interaction, format!("You selected: **{model}**.\nEnter the benchmark score for {whom}:")).await?;
        }

        // The dropdown is spent once a model is chosen.
        let cancel = vec![cancel_row(self.correlation)];
        self.set_components(cancel).await;

        Ok(())
    }

    async fn acknowledge(&mut self, responder: Self::Responder) -> Result<(), Error> {
        if let Some(interaction) = responder {
            interaction.create_response(&self.ctx, CreateInteractionResponse::Acknowledge).await?;
        }

        Ok(())
    }

    async fn committed(&mut self, _responder: Self::Responder, submission: &Submission) -> Result<(), Error> {
        self.set_components(Vec::new()).await;
        self.say(format!("✅ {}'s benchmark has been submitted and is awaiting verification.", submission.user_id.mention())).await?;

        if let Err(ex) = log_submission(&self.ctx, &self.db, self.guild_id, submission).await {
            warn!("Failed to post submission for {} to the log channel: {}", submission.user_id, ex);
        }

        Ok(())
    }

    async fn canceled(&mut self, responder: Self::Responder) -> Result<(), Error> {
        if let Some(interaction) = responder {
            self.respond_ephemeral(&interaction, "❌ Benchmarking process canceled.").await?;
        }

        if let Err(ex) = self.prompt.delete(&self.ctx).await {
            debug!("Failed to delete submission prompt {}: {}", self.prompt.id, ex);
        }

        Ok(())
    }

    async fn timed_out(&mut self, stage: TimeoutStage) -> Result<(), Error> {
        self.set_components(Vec::new()).await;

        let message = match stage {
            TimeoutStage::ScoreReply => BenchError::TimedOut.user_message(),
            TimeoutStage::Selection => None
        }.unwrap_or_else(|| "⏳ The submission prompt expired. Run the command again to submit.".to_string());

        self.say(message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> UserId {
        UserId::new(100)
    }

    #[test]
    fn component_ids_are_tagged_with_the_invocation() {
        assert_eq!(custom_id(42, SELECT_ID), "42:gpu");
        assert_eq!(custom_id(42, CANCEL_ID), "42:cancel");
        assert!(!custom_id(420, CANCEL_ID).starts_with(&custom_id(42, "")));
    }

    #[test]
    fn cancel_button_maps_to_cancel() {
        assert_eq!(component_event(&custom_id(42, CANCEL_ID), alice(), None), Some(WorkflowEvent::Cancel { actor: alice() }));
    }

    #[test]
    fn dropdown_maps_to_the_picked_model() {
        assert_eq!(
            component_event(&custom_id(42, SELECT_ID), alice(), Some("RTX 4090")),
            Some(WorkflowEvent::Select { actor: alice(), model: "RTX 4090".to_string() })
        );
        assert_eq!(component_event(&custom_id(42, SELECT_ID), alice(), None), None);
    }

    #[test]
    fn unknown_components_are_skipped() {
        assert_eq!(component_event("42:refresh", alice(), None), None);
        assert_eq!(component_event("cancel", alice(), None), None);
    }
}
