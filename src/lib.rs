pub mod config;
pub mod jira;
pub mod pipeline;
pub mod render;
pub mod splice;
