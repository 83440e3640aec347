//! speakercheck-cli library
//!
//! HTTP client for the speakercheck API plus the local config, token
//! storage and text rendering used by the `speakercheck` binary.

pub mod client;
pub mod config;
pub mod input;
pub mod render;
pub mod token;

pub use client::{ApiClient, ClientError};
pub use config::ClientConfig;
pub use token::TokenStore;
