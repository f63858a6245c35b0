pub mod cli;
pub mod config;
pub mod error;
pub mod gallery;
pub mod health;
pub mod imaging;
pub mod langflow;
pub mod models;
pub mod parser;
pub mod server;
