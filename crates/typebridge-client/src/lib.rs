//! Lazy query trees and the transport they are sent over.

mod client;
mod config;
mod error;
mod handle;
mod selection;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use client::{DynGraphqlClient, GraphqlClient, HttpClient};
pub use config::{ConfigError, SessionConfig, SESSION_PORT_ENV, SESSION_TOKEN_ENV};
pub use error::{GraphqlError, GraphqlErrors, QueryError, RemoteExecError};
pub use handle::{ObjectProxy, RemoteObjectHandle};
pub use selection::{query, render_literal, Selection};
pub use typebridge_model::WireValue;
