pub mod action;
pub mod api;
pub mod app;
pub mod cli;
pub mod components;
pub mod config;
pub mod dispatch;
pub mod mode;
pub mod models;
pub mod router;
pub mod store;
pub mod tui;
pub mod utils;
