//! Core logic for the message inspector bot.
//!
//! This crate is framework-agnostic. Telegram lives behind
//! [`messaging::port::MessagingPort`], implemented in the adapter crate, and
//! sessions behind [`store::SessionStore`].

pub mod actions;
pub mod callback;
pub mod codec;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod keyboard;
pub mod logging;
pub mod masking;
pub mod message;
pub mod messaging;
pub mod origin;
pub mod panels;
pub mod prefs;
pub mod report;
pub mod security;
pub mod service;
pub mod store;

pub use errors::{Error, Result};
