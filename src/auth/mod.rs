//! Authentication against the identity provider

mod token;

pub use token::{AccessToken, TokenProvider};
