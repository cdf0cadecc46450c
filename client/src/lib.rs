//! Typed client for the kid snack generator API.
//!
//! The client is sans-I/O: [`client::SnackApiClient`] builds requests and
//! parses responses as plain data, and the host executes the actual HTTP
//! round-trips with whatever transport it has. [`flow`] layers the screen
//! state machines on top: loading latches, save-once guarding, and inline
//! error strings.

pub mod client;
pub mod error;
pub mod flow;
pub mod http;

pub use client::SnackApiClient;
pub use error::ApiError;
pub use flow::{ActionState, AdminFlow, SuggestionFlow};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
