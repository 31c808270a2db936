mod auth;
mod health_check;

pub use auth::{activate_account, login, refresh_token, register};
pub use health_check::health_check;
