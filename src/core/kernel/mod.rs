//! Dispatch kernel - turns logical API calls into authenticated HTTP calls
//!
//! The kernel is resource agnostic: it knows how to authenticate,
//! route and report errors, and nothing about the resources being called.
//!
//! # Pipeline
//!
//! ```text
//! RequestDescriptor
//!   -> url::build_url                      (service table lookup)
//!   -> headers::base_headers               (id, content type, key/sign, hook, prod, UA)
//!        -> credentials::resolve_auth_header
//!             -> signer::sign_key
//!   -> headers::resolve_session            (the only await before the transport)
//!   -> Transport::send
//!   -> normalize::normalize                (failures only)
//! ```
//!
//! # Key Principles
//!
//! 1. **Fail early**: credentials, routes and static headers are validated
//!    before any I/O, and reported synchronously from [`Dispatcher::dispatch`]
//! 2. **One error shape**: every asynchronous failure becomes a
//!    [`NormalizedError`](crate::core::errors::NormalizedError)
//! 3. **Snapshot reads**: each call copies the shared configuration once
//! 4. **Pluggable**: transport, router and current-user lookup are traits
//!
//! # Example
//!
//! ```rust,no_run
//! use baas_dispatch::core::config::{Credentials, GlobalConfig};
//! use baas_dispatch::core::kernel::Dispatcher;
//! use baas_dispatch::core::types::RequestDescriptor;
//! use reqwest::Method;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let dispatcher = Dispatcher::builder(Credentials::new("app-id", "app-key"))
//!     .with_config(GlobalConfig::new().with_server_url("api", "https://api.example.com"))
//!     .build()?;
//!
//! let date = dispatcher
//!     .send(RequestDescriptor::new(Method::GET, "/date"))
//!     .await?;
//! println!("{}", date);
//! # Ok(())
//! # }
//! ```

pub mod credentials;
pub mod dispatcher;
pub mod headers;
pub mod normalize;
pub mod rest;
pub mod signer;
pub mod url;

// Re-export key types for convenience
pub use credentials::{resolve_auth_header, AuthHeader};
pub use dispatcher::{DispatchFuture, Dispatcher, DispatcherBuilder};
pub use headers::build_headers;
pub use normalize::normalize;
pub use rest::{ReqwestTransport, ReqwestTransportBuilder, TransportConfig};
pub use signer::{sign_key, sign_key_at};
pub use url::build_url;
