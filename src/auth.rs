//! Token value objects and scope handling.

pub mod scope;
pub mod token;

pub use scope::ScopeList;
pub use token::{Token, TokenSecret};
