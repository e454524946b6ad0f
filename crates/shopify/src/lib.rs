pub mod auth;
pub mod callback;
pub mod error;
pub mod store;
pub mod types;

pub use error::{OAuthError, OAuthResult};
pub use types::*;
