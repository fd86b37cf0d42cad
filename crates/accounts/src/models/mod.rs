//! Entities stored by the service.

mod token;
mod user;

pub use token::Token;
pub use user::{User, UserSummary};
