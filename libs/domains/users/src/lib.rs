//! Users Domain
//!
//! Accounts for the people working leads: attorneys and clients sign up,
//! log in and receive a bearer token carrying their role.
//!
//! # Features
//!
//! - Signup with a unique username and a role
//! - Password hashing with Argon2
//! - Login returning a signed access token
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← /auth/signup, /auth/login
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← password hashing, token issuance
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Postgres or in-memory
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_users::{handlers, InMemoryUserRepository, UserService};
//!
//! let service = UserService::new(InMemoryUserRepository::new(), jwt_auth);
//! let router = Router::new().nest("/auth", handlers::router(service));
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{UserError, UserResult};
pub use models::{LoginRequest, SignupRequest, TokenResponse, User};
pub use postgres::PgUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
