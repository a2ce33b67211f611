//! Mosaic Assets - Importer registry and scene cache
//!
//! Format importers implement [`Importer`] and are registered with an
//! [`AssetServer`], which picks one per file (extension first, then content
//! sniffing), runs the post-processing pipeline and caches the result.

mod error;
mod handle;
mod importer;
mod server;

pub use error::{AssetError, ParseError};
pub use handle::{AssetHandle, AssetId};
pub use importer::{Importer, ImporterRegistry};
pub use server::AssetServer;
