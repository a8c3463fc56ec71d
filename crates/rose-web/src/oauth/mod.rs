//! Twitter OAuth 1.0a relay state.
//!
//! A TVii console cannot complete a browser-based authorization itself, so
//! the relay correlates the two sides with a six-digit code:
//!
//! 1. The console asks for a code; the relay fetches a signed request token.
//! 2. The user enters the code in a browser and is sent to Twitter.
//! 3. Twitter redirects the browser back with a verifier; the relay exchanges it.
//! 4. The console polls with its code and collects the credentials once.
//!
//! ## Supported Standards
//! - RFC 5849: The OAuth 1.0 Protocol (HMAC-SHA1 signatures)

pub mod codes;
pub mod signature;
pub mod store;
mod types;

pub use store::{AssociationStore, Poll};
pub use types::{Association, AssociationStatus, Credentials};
