pub mod bridge;
pub mod config;
pub mod database;
pub mod entities;
pub mod init;
pub mod interfaces;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
