//! JWT session handling and REST client for the NexusCouncil CMS
//!
//! The client attaches the stored access token to every call, refreshes it
//! once on HTTP 401 and retries, and can fall back to a public read when the
//! session cannot be renewed. The [`views`] module builds the admin screens'
//! state on top of it.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::significant_drop_tightening,
    clippy::future_not_send
)]

pub mod api_client;
pub mod auth;
pub mod error;
pub mod optimistic;
pub mod refresh;
pub mod store;
pub mod views;

pub use api_client::{CmsClient, extract_error_detail};
pub use auth::{AuthEvent, AuthFlow, AuthState, AuthenticatedExecutor, transition};
pub use error::{ClientError, ClientResult, ErrorCategory};
pub use refresh::{RefreshOutcome, SessionRefresher, TokenRefresher};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore, open_store};
