//! Marshalling of values across the boundary between native code and the remote API.
//!
//! [`Codec::decode`] turns wire JSON into a [`Value`] guided by a [`TypeRef`](typebridge_model::TypeRef),
//! [`Codec::encode`] goes the other way. Native types plug in through [`FromValue`] and
//! [`IntoValue`].

mod codec;
mod error;
mod loader;
mod value;

pub use codec::Codec;
pub use error::CodecError;
pub use loader::{ObjectLoader, RemoteLoader, DIRECTORY, FILE};
pub use value::{proxy_from_value, proxy_into_value, FromValue, IntoValue, ObjectValue, Value};
