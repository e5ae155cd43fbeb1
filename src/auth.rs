//! Auth-domain values: consumer identity, request tokens, and the persisted access credential.

pub mod consumer;
pub mod credential;
pub mod secret;
pub mod token;

pub use consumer::*;
pub use credential::*;
pub use secret::*;
pub use token::*;
