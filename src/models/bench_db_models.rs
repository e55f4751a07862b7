use chrono::{DateTime, Utc};
use serenity::model::id::{ChannelId, RoleId, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub user_id: UserId,
    pub gpu_model: String,
    pub score: i64,
    pub verified: bool,
    pub submitted_at: DateTime<Utc>
}

pub struct BenchSettings {
    pub log_channel: Option<ChannelId>,
    pub staff_roles: Vec<RoleId>,
    pub gpu_models: Vec<String>
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogChannelToggle {
    Enabled(ChannelId),
    Disabled(ChannelId)
}
