//! commentctl - bulk comment management for WordPress-style comment tables.
//!
//! Reads comment statistics per post type and moderation status, deletes
//! comments in bulk while keeping each post's `comment_count` in sync, and
//! produces one-time-download ZIP backups of every comment and its metadata.
//!
//! - [`store`] - comment tables behind the [`store::CommentStore`] trait
//! - [`stats`] - statistics aggregation
//! - [`purge`] - serialized bulk delete
//! - [`backup`] - backup archives, download and retention
//! - [`http`] - admin API
//! - [`commands`] - CLI entry points

#![deny(unsafe_code)]

pub mod app;
pub mod audit;
pub mod backup;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod http;
pub mod logging;
pub mod paths;
pub mod purge;
pub mod security;
pub mod stats;
pub mod store;
pub mod ui;
pub mod utils;

pub use error::{Error, Result};
