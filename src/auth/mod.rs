//! Session tokens, password hashing and the authenticated-user extractor.

pub mod extractor;
pub mod password;
pub mod token;

pub use extractor::AuthUser;
pub use token::{issue_token, verify_token, Claims};
