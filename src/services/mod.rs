pub mod bot_init;
pub mod database;
pub mod bench_db;
pub mod settings_db;
pub mod permissions;
pub mod directory;
pub mod workflow;
