//! Todo List Library
//!
//! This module exports the core components for testing and integration.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod store;
pub mod types;
pub mod view;
pub mod web;
