//! Bearer-token authentication.
//!
//! Tokens are HS-family JWTs carrying the principal's username (`sub`) and
//! [`Role`]. The middleware verifies the token and stores the typed
//! [`Principal`] in request extensions; handlers take `Principal` as an
//! extractor and call [`Principal::require_role`] where a role is needed.
//!
//! ```ignore
//! async fn update_status(principal: Principal, ...) -> Result<..., LeadError> {
//!     principal.require_role(Role::Attorney)?;
//!     ...
//! }
//! ```

pub mod config;
pub mod error;
pub mod jwt;
pub mod middleware;

pub use config::JwtConfig;
pub use error::AuthError;
pub use jwt::{Claims, JwtAuth, Principal, Role};
pub use middleware::jwt_auth_middleware;
