//! Client core for the Jokester chat front-end.
//!
//! [`ChatController`] owns the transcript, the draft and the in-flight guard.
//! It talks to the backend through a [`Transport`]; [`HttpTransport`] is the
//! production implementation.

pub mod config;
pub mod controller;
pub mod error;
pub mod transport;

pub use config::{load_settings, ChatSettings, DEFAULT_CONFIG_PATH};
pub use controller::{
    ChatController, Phase, RejectReason, SessionEvent, SessionSnapshot, SubmitOutcome,
};
pub use error::{ConfigError, TransportError};
pub use transport::{HttpTransport, Transport};
