//! The two-step benchmark submission: pick a GPU from the catalog, then reply
//! with a score before the window closes.
//!
//! `Workflow` is the bare state machine. `run_workflow` drives one instance
//! from a channel of [`Envelope`]s and hands every side effect to a
//! [`SubmissionUi`], so the Discord layer only has to translate collector
//! events into envelopes.

use std::time::Duration;
use async_trait::async_trait;
use serenity::model::id::{GuildId, UserId};
use tokio::sync::mpsc;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info, warn};
use crate::Error;
use crate::error::BenchError;
use crate::models::bench_db_models::Submission;
use crate::util::parse_score;
use super::database::Database;

pub const SCORE_REPLY_TIMEOUT: Duration = Duration::from_secs(60);
pub const SELECTION_TIMEOUT: Duration = Duration::from_secs(180);

/// Correlates UI events with the invocation that started the workflow.
pub type WorkflowId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowEvent {
    Select { actor: UserId, model: String },
    Reply { actor: UserId, content: String },
    Cancel { actor: UserId },
    Expired
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    AwaitingModelSelection { deadline: Instant },
    AwaitingScoreReply { model: String, deadline: Instant },
    Committed { model: String, score: i64 },
    Canceled,
    TimedOut
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    NotYours(UserId),
    ModelSelected(String),
    Ignored,
    Commit { model: String, score: i64 },
    Canceled,
    TimedOut
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutStage {
    Selection,
    ScoreReply
}

pub struct Workflow {
    id: WorkflowId,
    guild_id: GuildId,
    invoker: UserId,
    target: UserId,
    catalog: Vec<String>,
    state: WorkflowState
}

impl Workflow {
    /// `target` is `None` when the invoker submits for themselves.
    pub fn start(id: WorkflowId, guild_id: GuildId, invoker: UserId, target: Option<UserId>, catalog: Vec<String>, now: Instant) -> Result<Self, BenchError> {
        if catalog.is_empty() {
            return Err(BenchError::EmptyCatalog);
        }

        Ok(Self {
            id,
            guild_id,
            invoker,
            target: target.unwrap_or(invoker),
            catalog,
            state: WorkflowState::AwaitingModelSelection { deadline: now + SELECTION_TIMEOUT }
        })
    }

    pub fn id(&self) -> WorkflowId {
        self.id
    }

    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    pub fn invoker(&self) -> UserId {
        self.invoker
    }

    pub fn target(&self) -> UserId {
        self.target
    }

    pub fn is_self_submission(&self) -> bool {
        self.target == self.invoker
    }

    pub fn catalog(&self) -> &[String] {
        &self.catalog
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// When the current wait gives up. `None` once the workflow has finished.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            WorkflowState::AwaitingModelSelection { deadline } => Some(deadline),
            WorkflowState::AwaitingScoreReply { deadline, .. } => Some(deadline),
            _ => None
        }
    }

    pub fn handle(&mut self, event: WorkflowEvent, now: Instant) -> Transition {
        let Some(deadline) = self.deadline() else {
            return Transition::Ignored;
        };

        if now >= deadline {
            self.state = WorkflowState::TimedOut;
            return Transition::TimedOut;
        }

        match event {
            WorkflowEvent::Expired => {
                self.state = WorkflowState::TimedOut;
                Transition::TimedOut
            }
            WorkflowEvent::Cancel { actor } => {
                if actor != self.invoker {
                    return Transition::NotYours(actor);
                }

                self.state = WorkflowState::Canceled;
                Transition::Canceled
            }
            WorkflowEvent::Select { actor, model } => {
                if actor != self.invoker {
                    return Transition::NotYours(actor);
                }

                // The dropdown is gone once a model is picked; stale clicks change nothing.
                if !matches!(self.state, WorkflowState::AwaitingModelSelection { .. }) || !self.catalog.contains(&model) {
                    return Transition::Ignored;
                }

                self.state = WorkflowState::AwaitingScoreReply {
                    model: model.clone(),
                    deadline: now + SCORE_REPLY_TIMEOUT
                };
                Transition::ModelSelected(model)
            }
            WorkflowEvent::Reply { actor, content } => {
                let WorkflowState::AwaitingScoreReply { model, .. } = &self.state else {
                    return Transition::Ignored;
                };

                if actor != self.invoker {
                    return Transition::Ignored;
                }

                match parse_score(&content) {
                    Some(score) => {
                        let model = model.clone();
                        self.state = WorkflowState::Committed { model: model.clone(), score };
                        Transition::Commit { model, score }
                    }
                    None => Transition::Ignored
                }
            }
        }
    }
}

pub struct Envelope<R> {
    pub correlation: WorkflowId,
    pub event: WorkflowEvent,
    pub responder: R
}

#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Committed(Submission),
    Canceled,
    TimedOut(TimeoutStage)
}

/// Everything the workflow shows to people. The responder is whatever the
/// front end needs to answer the event that caused the call.
#[async_trait]
pub trait SubmissionUi: Send {
    type Responder: Send;

    async fn not_yours(&mut self, responder: Self::Responder) -> Result<(), Error>;
    async fn model_selected(&mut self, responder: Self::Responder, model: &str, target: UserId, self_submission: bool) -> Result<(), Error>;
    async fn acknowledge(&mut self, responder: Self::Responder) -> Result<(), Error>;
    async fn committed(&mut self, responder: Self::Responder, submission: &Submission) -> Result<(), Error>;
    async fn canceled(&mut self, responder: Self::Responder) -> Result<(), Error>;
    async fn timed_out(&mut self, stage: TimeoutStage) -> Result<(), Error>;
}

/// Drives `workflow` to completion. Nothing is written unless a score arrives in time.
pub async fn run_workflow<U: SubmissionUi>(
    mut workflow: Workflow,
    mut events: mpsc::Receiver<Envelope<U::Responder>>,
    db: &Database,
    ui: &mut U
) -> Result<Outcome, Error> {
    loop {
        let Some(deadline) = workflow.deadline() else {
            return Err(format!("workflow {} finished without an outcome", workflow.id()).into());
        };

        let stage = match workflow.state() {
            WorkflowState::AwaitingScoreReply { .. } => TimeoutStage::ScoreReply,
            _ => TimeoutStage::Selection
        };

        let (event, responder) = match timeout_at(deadline, events.recv()).await {
            Ok(Some(envelope)) => {
                if envelope.correlation != workflow.id() {
                    debug!("Dropping event for workflow {} sent to {}", envelope.correlation, workflow.id());
                    continue;
                }

                (envelope.event, Some(envelope.responder))
            }
            // Either the wait ran out or the event source went away.
            Ok(None) | Err(_) => (WorkflowEvent::Expired, None)
        };

        match workflow.handle(event, Instant::now()) {
            Transition::NotYours(actor) => {
                debug!("User {} tried to use workflow {} owned by {}", actor, workflow.id(), workflow.invoker());
                if let Some(responder) = responder {
                    if let Err(ex) = ui.not_yours(responder).await {
                        warn!("Failed to tell {} that workflow {} is not theirs: {}", actor, workflow.id(), ex);
                    }
                }
            }
            Transition::ModelSelected(model) => {
                if let Some(responder) = responder {
                    ui.model_selected(responder, &model, workflow.target(), workflow.is_self_submission()).await?;
                }
            }
            Transition::Ignored => {
                if let Some(responder) = responder {
                    if let Err(ex) = ui.acknowledge(responder).await {
                        warn!("Failed to acknowledge an event for workflow {}: {}", workflow.id(), ex);
                    }
                }
            }
            Transition::Commit { model, score } => {
                let submission = db.upsert_submission(workflow.target(), &model, score)?;
                info!("Recorded {} for {} on {} in guild {} (submitted by {})",
                    score, workflow.target(), model, workflow.guild_id(), workflow.invoker());

                if let Some(responder) = responder {
                    ui.committed(responder, &submission).await?;
                }
                return Ok(Outcome::Committed(submission));
            }
            Transition::Canceled => {
                if let Some(responder) = responder {
                    ui.canceled(responder).await?;
                }
                return Ok(Outcome::Canceled);
            }
            Transition::TimedOut => {
                if let Some(responder) = responder {
                    if let Err(ex) = ui.acknowledge(responder).await {
                        warn!("Failed to acknowledge an event for workflow {}: {}", workflow.id(), ex);
                    }
                }
                ui.timed_out(stage).await?;
                return Ok(Outcome::TimedOut(stage));
            }
        }
    }
}
