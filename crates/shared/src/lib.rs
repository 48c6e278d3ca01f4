pub mod candidates;
pub mod config;
mod config_env;
pub mod dialogue;
pub mod dictionaries;
pub mod intent;
pub mod models;
pub mod normalize;
pub mod providers;
pub mod resolver;
pub mod service;
pub mod session_store;
