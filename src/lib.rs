//! Pokedex catalog viewer built on tui-dispatch
//!
//! The library exposes the app's modules for the binary and for testing.

pub mod action;
pub mod api;
pub mod components;
pub mod config;
pub mod effect;
pub mod logger;
pub mod query;
pub mod reducer;
pub mod scroll;
pub mod sprite;
pub mod state;
pub mod stats;
