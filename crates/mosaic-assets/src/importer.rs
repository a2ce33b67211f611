use std::path::Path;

use mosaic_scene::Scene;
use tracing::debug;

use crate::error::ParseError;

/// A file-format loader that turns raw bytes into a [`Scene`].
///
/// The scene it returns must satisfy the scene invariants; post-processing
/// assumes them.
pub trait Importer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Lower-case file extensions (without the dot) this importer claims.
    fn extensions(&self) -> &'static [&'static str];

    /// Content sniffing for files whose extension no importer claims.
    /// `header` holds the first bytes of the file.
    fn can_read(&self, _path: &Path, _header: &[u8]) -> bool {
        false
    }

    fn parse(&self, bytes: &[u8]) -> Result<Scene, ParseError>;
}

/// Registered importers, consulted in registration order.
#[derive(Default)]
pub struct ImporterRegistry {
    importers: Vec<Box<dyn Importer>>,
}

impl ImporterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<I: Importer + 'static>(&mut self, importer: I) {
        debug!("Registered importer {}", importer.name());
        self.importers.push(Box::new(importer));
    }

    /// Importer for `path`: the first one claiming its extension, otherwise
    /// the first one whose content sniffing accepts `header`.
    pub fn find(&self, path: &Path, header: &[u8]) -> Option<&dyn Importer> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        extension
            .and_then(|ext| {
                self.importers
                    .iter()
                    .find(|i| i.extensions().iter().any(|&e| e == ext))
            })
            .or_else(|| self.importers.iter().find(|i| i.can_read(path, header)))
            .map(|i| &**i)
    }

    pub fn len(&self) -> usize {
        self.importers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.importers.is_empty()
    }
}
