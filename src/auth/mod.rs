//! Authentication and authorization

pub mod cookie;
pub mod gate;
pub mod jwt;
pub mod models;
pub mod password;
pub mod session;
pub mod store;

pub use cookie::CookiePolicy;
pub use gate::{AuthGate, IdentityResolver, Resolution};
pub use jwt::{Claims, TokenIssuer};
pub use models::{ArtistContext, AuthContext, AuthSource, NewUser, Role, User};
pub use password::PasswordHasher;
pub use session::{Session, SessionManager};
pub use store::{MemoryUserStore, UserStore};

/// Why the gate refused a request
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Unauthorized")]
    NoCredentials,

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token")]
    Invalid,

    #[error("This action requires the {required} role")]
    Forbidden { required: Role, actual: Role },
}
