use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub token: String,
    pub cmd_prefix: String,
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_log_directory")]
    pub log_directory: String
}

fn default_database_path() -> String {
    "data/gpubench.db".to_string()
}

fn default_log_directory() -> String {
    "logs".to_string()
}
