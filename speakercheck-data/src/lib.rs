//! speakercheck-data library
//!
//! Domain model, availability workflow, role policy and the SQLite store
//! shared by the speakercheck server and client.

pub mod auth;
pub mod availability;
pub mod db;
pub mod error;
pub mod model;

pub use availability::{AvailabilityChange, AvailabilityRequest, AvailabilityState};
pub use error::{DataError, Result};
pub use model::{
    Availability, AuthResponse, Credentials, NewPage, NewSpeaker, Page, PageUpdate, Role, Speaker,
    SpeakerUpdate, User, UserRef,
};

// Re-export rusqlite Connection for consumers
pub use rusqlite::Connection;
