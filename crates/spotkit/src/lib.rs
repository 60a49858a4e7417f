//! # spotkit
//!
//! Blocking client for the Spot.io API.
//!
//! This crate provides:
//! - Credential resolution (flags, environment, OAuth, credentials file)
//! - Response envelope decoding with vendor error codes
//! - Resource collections (managed instances, elastigroups, EMR scalers)
//!   implementing [`declarative::RemoteCollection`]
//! - Account and user administration
//!
//! ## Example
//!
//! ```no_run
//! use declarative::RemoteCollection;
//! use spotkit::auth::{self, CredentialParams, OAuthExchange, ProcessEnv};
//! use spotkit::resources::{Collection, ELASTIGROUP};
//! use spotkit::SpotClient;
//!
//! let credentials = auth::resolve(&CredentialParams::default(), &ProcessEnv, &OAuthExchange::new())
//!     .expect("no credentials");
//! let client = SpotClient::new(credentials);
//!
//! for group in Collection::new(&client, &ELASTIGROUP).list().unwrap() {
//!     println!("{} {}", group.id, group.name);
//! }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod mock;
pub mod resources;
pub mod setup;

// Re-export main types at crate root
pub use auth::{CredentialParams, Credentials};
pub use client::{DEFAULT_API_BASE, SpotClient};
pub use error::{Error, ErrorCategory, ErrorCode, Result};
pub use resources::{Collection, Endpoint};
pub use setup::{Account, AccountsApi, NewUser, Role, RoleMapping, UserRole, UsersApi};
