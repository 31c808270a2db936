/// Authentication primitives
///
/// JWT issuance/validation for access and refresh tokens, and bcrypt
/// password hashing.

mod claims;
mod jwt;
mod password;

pub use claims::Claims;
pub use claims::TokenKind;
pub use jwt::issue_token;
pub use jwt::validate_token;
pub use jwt::IssuedToken;
pub use password::hash_password;
pub use password::verify_password;
