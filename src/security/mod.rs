//! Request authorization and input hardening.
//!
//! - [`AdminToken`]: capability check for admin routes
//! - [`NonceIssuer`]: action-bound anti-forgery nonces
//! - [`sanitize_file_name`]: reduces download names to a safe basename

mod error;
mod filename;
mod nonce;
mod token;

pub use error::FileNameError;
pub use filename::{is_traversal_attempt, sanitize_file_name};
pub use nonce::{NonceAction, NonceIssuer};
pub use token::AdminToken;
