use async_trait::async_trait;
use serenity::http::Http;
use serenity::model::id::UserId;
use tracing::warn;
use crate::Error;
use crate::models::bench_db_models::Submission;

pub const UNKNOWN_USER: &str = "Unknown User";

/// Resolves stored user ids to something a human can read.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn display_name(&self, user_id: UserId) -> Result<String, Error>;
}

#[async_trait]
impl UserDirectory for Http {
    async fn display_name(&self, user_id: UserId) -> Result<String, Error> {
        let user = self.get_user(user_id).await?;
        Ok(user.display_name().to_string())
    }
}

pub struct LabeledSubmission {
    pub name: String,
    pub submission: Submission
}

/// One failed lookup only costs that entry its name.
pub async fn label_submissions(directory: &dyn UserDirectory, submissions: Vec<Submission>) -> Vec<LabeledSubmission> {
    let mut labeled = Vec::with_capacity(submissions.len());

    for submission in submissions {
        let name = match directory.display_name(submission.user_id).await {
            Ok(name) => name,
            Err(ex) => {
                warn!("Failed to resolve user {}: {}", submission.user_id, ex);
                UNKNOWN_USER.to_string()
            }
        };

        labeled.push(LabeledSubmission { name, submission });
    }

    labeled
}
