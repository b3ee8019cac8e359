//! A terminal system monitor: CPU and memory gauges with history graphs,
//! network rates, disk usage, battery and uptime, over a sortable, filterable
//! process table with kill support.
//!
//! Fast metrics and the process scan refresh on independent cadences from a
//! single cooperative loop ([`app::App`]); user input mutates the same state
//! and publishes immediately.

pub mod app;
pub mod config;
pub mod core;
pub mod display;
pub mod event;
pub mod history;
pub mod input;
pub mod monitor;
pub mod process_table;
pub mod provider;
pub mod rate;
pub mod scheduler;
pub mod view_model;

pub use crate::core::{Result, SysmonError};
