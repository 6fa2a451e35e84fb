//! Token and cookie primitives built from the configured secrets.

mod cookie;
mod extract;
mod jwt;

pub use cookie::cookie_key;
pub use extract::AccessClaims;
pub use jwt::{Claims, JwtManager, TokenType};
