use rusqlite::{Connection, OptionalExtension, params};
use serenity::model::id::{ChannelId, GuildId, RoleId};
use crate::error::BenchError;
use crate::models::bench_db_models::{BenchSettings, LogChannelToggle};
use super::database::{Database, from_sql_id, to_sql_id};

fn query_log_channel(conn: &Connection, guild_id: GuildId) -> rusqlite::Result<Option<ChannelId>> {
    let channel: Option<Option<i64>> = conn.query_row(
        "SELECT log_channel FROM settings WHERE guild_id = ?1",
        [to_sql_id(guild_id.get())],
        |row| row.get(0)
    ).optional()?;

    Ok(channel
        .flatten()
        .filter(|id| *id != 0)
        .map(|id| ChannelId::new(from_sql_id(id))))
}

fn upsert_log_channel(conn: &Connection, guild_id: GuildId, channel: Option<ChannelId>) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO settings (guild_id, log_channel) VALUES (?1, ?2)
         ON CONFLICT(guild_id) DO UPDATE SET log_channel = excluded.log_channel",
        params![to_sql_id(guild_id.get()), channel.map(|c| to_sql_id(c.get()))]
    )?;
    Ok(())
}

impl Database {
    // -- Log channel --

    pub fn get_log_channel(&self, guild_id: GuildId) -> Result<Option<ChannelId>, BenchError> {
        self.with_conn(|conn| query_log_channel(conn, guild_id))
    }

    pub fn set_log_channel(&self, guild_id: GuildId, channel: ChannelId) -> Result<(), BenchError> {
        self.with_conn(|conn| upsert_log_channel(conn, guild_id, Some(channel)))
    }

    /// Clears the log channel if one is set, otherwise points it at `here`.
    pub fn toggle_log_channel(&self, guild_id: GuildId, here: ChannelId) -> Result<LogChannelToggle, BenchError> {
        self.with_conn(|conn| {
            match query_log_channel(conn, guild_id)? {
                Some(current) => {
                    upsert_log_channel(conn, guild_id, None)?;
                    Ok(LogChannelToggle::Disabled(current))
                }
                None => {
                    upsert_log_channel(conn, guild_id, Some(here))?;
                    Ok(LogChannelToggle::Enabled(here))
                }
            }
        })
    }

    // -- Staff roles --

    /// Returns false if the role was already registered.
    pub fn add_staff_role(&self, guild_id: GuildId, role_id: RoleId) -> Result<bool, BenchError> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO staff_roles (guild_id, role_id) VALUES (?1, ?2)",
                [to_sql_id(guild_id.get()), to_sql_id(role_id.get())]
            )?;
            Ok(inserted > 0)
        })
    }

    pub fn remove_staff_role(&self, guild_id: GuildId, role_id: RoleId) -> Result<bool, BenchError> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM staff_roles WHERE guild_id = ?1 AND role_id = ?2",
                [to_sql_id(guild_id.get()), to_sql_id(role_id.get())]
            )?;
            Ok(removed > 0)
        })
    }

    pub fn get_staff_roles(&self, guild_id: GuildId) -> Result<Vec<RoleId>, BenchError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT role_id FROM staff_roles WHERE guild_id = ?1 ORDER BY rowid")?;
            let rows = stmt.query_map([to_sql_id(guild_id.get())], |row| {
                let id: i64 = row.get(0)?;
                Ok(RoleId::new(from_sql_id(id)))
            })?;
            rows.collect()
        })
    }

    // -- GPU model catalog --

    pub fn add_gpu_model(&self, model_name: &str) -> Result<bool, BenchError> {
        self.with_conn(|conn| {
            let inserted = conn.execute("INSERT OR IGNORE INTO gpu_models (model_name) VALUES (?1)", [model_name])?;
            Ok(inserted > 0)
        })
    }

    pub fn remove_gpu_model(&self, model_name: &str) -> Result<bool, BenchError> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM gpu_models WHERE model_name = ?1", [model_name])?;
            Ok(removed > 0)
        })
    }

    pub fn get_gpu_models(&self) -> Result<Vec<String>, BenchError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT model_name FROM gpu_models ORDER BY rowid")?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            rows.collect()
        })
    }

    pub fn get_bench_settings(&self, guild_id: GuildId) -> Result<BenchSettings, BenchError> {
        Ok(BenchSettings {
            log_channel: self.get_log_channel(guild_id)?,
            staff_roles: self.get_staff_roles(guild_id)?,
            gpu_models: self.get_gpu_models()?
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guild() -> GuildId {
        GuildId::new(10)
    }

    fn other_guild() -> GuildId {
        GuildId::new(20)
    }

    #[test]
    fn log_channel_starts_unset() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get_log_channel(guild()).unwrap(), None);
    }

    #[test]
    fn set_log_channel_overwrites() {
        let db = Database::open_in_memory().unwrap();
        db.set_log_channel(guild(), ChannelId::new(1)).unwrap();
        db.set_log_channel(guild(), ChannelId::new(2)).unwrap();

        assert_eq!(db.get_log_channel(guild()).unwrap(), Some(ChannelId::new(2)));
        assert_eq!(db.get_log_channel(other_guild()).unwrap(), None);
    }

    #[test]
    fn toggle_creates_the_row_then_clears_it() {
        let db = Database::open_in_memory().unwrap();
        let here = ChannelId::new(5);

        assert_eq!(db.toggle_log_channel(guild(), here).unwrap(), LogChannelToggle::Enabled(here));
        assert_eq!(db.get_log_channel(guild()).unwrap(), Some(here));

        assert_eq!(db.toggle_log_channel(guild(), ChannelId::new(6)).unwrap(), LogChannelToggle::Disabled(here));
        assert_eq!(db.get_log_channel(guild()).unwrap(), None);

        // The settings row survives being toggled off.
        let rows: i64 = db.with_conn(|conn| conn.query_row("SELECT COUNT(*) FROM settings", [], |row| row.get(0))).unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn staff_roles_have_set_semantics() {
        let db = Database::open_in_memory().unwrap();
        let role = RoleId::new(7);

        assert!(db.add_staff_role(guild(), role).unwrap());
        assert!(!db.add_staff_role(guild(), role).unwrap());
        assert_eq!(db.get_staff_roles(guild()).unwrap(), vec![role]);
        assert!(db.get_staff_roles(other_guild()).unwrap().is_empty());

        assert!(db.remove_staff_role(guild(), role).unwrap());
        assert!(!db.remove_staff_role(guild(), role).unwrap());
        assert!(db.get_staff_roles(guild()).unwrap().is_empty());
    }

    #[test]
    fn catalog_add_and_remove() {
        let db = Database::open_in_memory().unwrap();

        assert!(db.add_gpu_model("Intel Arc B580").unwrap());
        assert!(!db.add_gpu_model("Intel Arc B580").unwrap());
        assert_eq!(db.get_gpu_models().unwrap().last().map(String::as_str), Some("Intel Arc B580"));

        assert!(db.remove_gpu_model("Intel Arc B580").unwrap());
        assert!(!db.remove_gpu_model("Intel Arc B580").unwrap());
        assert_eq!(db.get_gpu_models().unwrap().len(), 10);
    }

    #[test]
    fn settings_snapshot() {
        let db = Database::open_in_memory().unwrap();
        db.set_log_channel(guild(), ChannelId::new(3)).unwrap();
        db.add_staff_role(guild(), RoleId::new(4)).unwrap();

        let settings = db.get_bench_settings(guild()).unwrap();
        assert_eq!(settings.log_channel, Some(ChannelId::new(3)));
        assert_eq!(settings.staff_roles, vec![RoleId::new(4)]);
        assert_eq!(settings.gpu_models.len(), 10);
    }
}
