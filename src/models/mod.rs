pub mod config;
pub mod macros;
pub mod bench_db_models;
