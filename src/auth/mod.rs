pub mod credentials;
pub mod handlers;
pub mod middleware;
pub mod session;
pub mod tokens;

pub use middleware::AuthUser;
