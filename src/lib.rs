//! Client for a two-player chess server speaking a line-based text protocol.
//!
//! The server decides what is legal; this crate only mirrors what it reports.

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod models;
pub mod ui;
