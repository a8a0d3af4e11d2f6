//! External collaborators and stateless service objects.
//!
//! All clients are constructed once in [`crate::state::AppState::new`] and
//! dependency-injected into handlers through the state; none hold ambient
//! global credentials.

pub mod email;
pub mod passwords;
pub mod storage;
pub mod stripe;
pub mod tokens;

pub use email::EmailService;
pub use storage::StorageClient;
pub use stripe::StripeClient;
pub use tokens::TokenService;
