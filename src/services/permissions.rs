use serenity::model::id::{GuildId, RoleId, UserId};
use tracing::debug;
use crate::error::BenchError;
use super::database::Database;

// Support account that may always act as staff.
pub const SUPPORT_USER_ID: u64 = 119087962200735745;

pub fn is_privileged(actor: UserId) -> bool {
    actor.get() == SUPPORT_USER_ID
}

impl Database {
    pub fn is_staff(&self, guild_id: GuildId, member_roles: &[RoleId]) -> Result<bool, BenchError> {
        if member_roles.is_empty() {
            return Ok(false);
        }

        let staff_roles = self.get_staff_roles(guild_id)?;
        Ok(member_roles.iter().any(|role| staff_roles.contains(role)))
    }
}

/// Call before any staff-only mutation.
pub fn require_staff(db: &Database, guild_id: GuildId, actor: UserId, member_roles: &[RoleId]) -> Result<(), BenchError> {
    if is_privileged(actor) || db.is_staff(guild_id, member_roles)? {
        return Ok(());
    }

    debug!("Denied staff action for {} in guild {}", actor, guild_id);
    Err(BenchError::PermissionDenied)
}
