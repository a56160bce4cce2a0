//! Format-agnostic resource loading.
//!
//! A request names a resource by identifier (a file path, or a path inside a zip
//! archive). A `SourceManager` resolves it to a full identifier, opens a byte
//! stream and hands it to the `Loader` registered for the identifier's type tag
//! in the `Registries`. Decoded objects can be kept in a `Cache`, keyed by type
//! and full identifier, so that the next request for the same resource skips
//! decoding.
//!
//! Decoders may load further resources through the manager they are given (a
//! model loading its textures); those nested loads follow the same protocol.

mod assets;
mod cache;
mod data;
mod error;
mod loader;
mod loaders;
mod manager;
mod registry;

pub use assets::*;
pub use cache::*;
pub use data::*;
pub use error::*;
pub use loader::*;
pub use loaders::*;
pub use manager::*;
pub use registry::*;
