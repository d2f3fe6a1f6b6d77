//! Configuration module for Skape.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{
    ApiSettings, GeneralSettings, PollSettings, Settings, ThrottleSettings, API_KEY_ENV,
};
