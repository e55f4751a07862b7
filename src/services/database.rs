use std::fs;
use std::path::Path;
use std::sync::Mutex;
use rusqlite::Connection;
use tracing::info;
use crate::error::BenchError;

// Offered in the submission dropdown until staff edit the catalog.
const DEFAULT_GPU_MODELS: [&str; 10] = [
    "NVIDIA GeForce RTX 5090",
    "NVIDIA GeForce RTX 5080",
    "NVIDIA GeForce RTX 5070",
    "NVIDIA GeForce RTX 4090",
    "NVIDIA GeForce RTX 4080",
    "NVIDIA GeForce RTX 4070",
    "NVIDIA GeForce RTX 3090",
    "AMD Radeon RX 7900 XTX",
    "AMD Radeon RX 7900 XT",
    "AMD Radeon RX 7800 XT"
];

/// Single-file SQLite store shared by every command through the bot's `Data`.
pub struct Database {
    conn: Mutex<Connection>
}

impl Database {
    pub fn open(path: &Path) -> Result<Self, BenchError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        let db = Self::from_connection(conn)?;
        info!("Database opened at {}", path.display());

        Ok(db)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, BenchError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, BenchError> {
        migrate(&conn)?;
        seed_gpu_models(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn)
        })
    }

    pub fn close(self) -> Result<(), BenchError> {
        let conn = self.conn.into_inner().map_err(|_| BenchError::StorePoisoned)?;
        conn.close().map_err(|(_, ex)| BenchError::Database(ex))?;
        info!("Database closed");

        Ok(())
    }

    /// Runs `f` while holding the connection lock. Never call this re-entrantly.
    pub(crate) fn with_conn<F, T>(&self, f: F) -> Result<T, BenchError>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>
    {
        let conn = self.conn.lock().map_err(|_| BenchError::StorePoisoned)?;
        Ok(f(&conn)?)
    }
}

// Discord snowflakes fit in 63 bits, so the cast round-trips.
pub(crate) fn to_sql_id(id: u64) -> i64 {
    id as i64
}

pub(crate) fn from_sql_id(id: i64) -> u64 {
    id as u64
}

fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS gpubenchmarks (
            user_id         INTEGER PRIMARY KEY,
            gpu_model       TEXT NOT NULL,
            benchmark_score INTEGER NOT NULL,
            verified        INTEGER NOT NULL DEFAULT 0,
            submitted_at    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS settings (
            guild_id    INTEGER PRIMARY KEY,
            log_channel INTEGER
        );

        CREATE TABLE IF NOT EXISTS staff_roles (
            guild_id INTEGER,
            role_id  INTEGER,
            PRIMARY KEY (guild_id, role_id)
        );

        CREATE TABLE IF NOT EXISTS gpu_models (
            model_name TEXT PRIMARY KEY
        );
        "
    )
}

fn seed_gpu_models(conn: &Connection) -> rusqlite::Result<()> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM gpu_models", [], |row| row.get(0))?;
    if count > 0 {
        return Ok(());
    }

    let mut stmt = conn.prepare("INSERT OR IGNORE INTO gpu_models (model_name) VALUES (?1)")?;
    for model in DEFAULT_GPU_MODELS {
        stmt.execute([model])?;
    }

    info!("Seeded {} default GPU models", DEFAULT_GPU_MODELS.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_store_is_seeded_in_order() {
        let db = Database::open_in_memory().unwrap();
        let models = db.get_gpu_models().unwrap();

        assert_eq!(models.len(), 10);
        assert_eq!(models[0], "NVIDIA GeForce RTX 5090");
        assert_eq!(models[9], "AMD Radeon RX 7800 XT");
    }

    #[test]
    fn seed_skips_a_non_empty_catalog() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn.execute("INSERT INTO gpu_models (model_name) VALUES ('Intel Arc B580')", []).unwrap();

        let db = Database::from_connection(conn).unwrap();
        assert_eq!(db.get_gpu_models().unwrap(), vec!["Intel Arc B580".to_string()]);
    }

    #[test]
    fn seed_is_not_repeated_after_the_catalog_is_emptied() {
        let db = Database::open_in_memory().unwrap();
        for model in DEFAULT_GPU_MODELS {
            db.remove_gpu_model(model).unwrap();
        }
        db.add_gpu_model("RTX 4090").unwrap();

        assert_eq!(db.get_gpu_models().unwrap(), vec!["RTX 4090".to_string()]);
    }

    #[test]
    fn open_creates_parent_directory_and_closes() {
        let dir = std::env::temp_dir().join(format!("gpubench-test-{}", std::process::id()));
        let path = dir.join("nested").join("gpubench.db");

        let db = Database::open(&path).unwrap();
        assert!(path.exists());
        db.close().unwrap();

        let reopened = Database::open(&path).unwrap();
        assert_eq!(reopened.get_gpu_models().unwrap().len(), 10);
        reopened.close().unwrap();

        fs::remove_dir_all(&dir).unwrap();
    }
}
