use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use mosaic_process::{Pipeline, PostProcessSteps, ProcessConfig};
use mosaic_scene::Scene;
use tracing::{debug, info};

use crate::error::AssetError;
use crate::handle::{AssetHandle, AssetId};
use crate::importer::{Importer, ImporterRegistry};

/// Bytes handed to content sniffing.
const HEADER_LEN: usize = 64;

/// Loads scenes through the registered importers, post-processes them and
/// caches the result per (path, step selection).
pub struct AssetServer {
    base_path: PathBuf,
    importers: ImporterRegistry,
    pipeline: Pipeline,
    scenes: HashMap<AssetId, Scene>,
    path_to_scene: HashMap<(PathBuf, PostProcessSteps), AssetHandle<Scene>>,
    next_id: u64,
}

impl AssetServer {
    /// Create a new AssetServer rooted at the given base path.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        let base_path = base_path.into();
        info!("AssetServer created with base path: {}", base_path.display());
        Self {
            base_path,
            importers: ImporterRegistry::new(),
            pipeline: Pipeline::standard(),
            scenes: HashMap::new(),
            path_to_scene: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn register_importer<I: Importer + 'static>(&mut self, importer: I) {
        self.importers.register(importer);
    }

    /// Configure the processing steps for subsequent loads.
    ///
    /// Scenes already loaded stay available through their handles, but the
    /// path cache is cleared so the next load of any path is processed with
    /// the new configuration.
    pub fn set_process_config(&mut self, config: &ProcessConfig) {
        self.pipeline.setup(config);
        if !self.path_to_scene.is_empty() {
            debug!("Process config changed, forgetting {} cached paths", self.path_to_scene.len());
            self.path_to_scene.clear();
        }
    }

    /// Resolve a relative asset path against the base path.
    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }

    /// Load, import and post-process the scene at `path`.
    /// Subsequent loads of the same path with the same steps return the cached handle.
    pub fn load_scene(
        &mut self,
        path: &Path,
        steps: PostProcessSteps,
    ) -> Result<AssetHandle<Scene>, AssetError> {
        let full_path = self.resolve(path);

        if let Some(&handle) = self.path_to_scene.get(&(full_path.clone(), steps)) {
            return Ok(handle);
        }

        if !full_path.exists() {
            return Err(AssetError::NotFound(full_path));
        }

        let bytes = fs::read(&full_path).map_err(|e| AssetError::Io(full_path.clone(), e))?;
        let scene = self.import_bytes(&full_path, &bytes, steps)?;
        info!(
            "Loaded {} | {} meshes, {} vertices, {} faces",
            full_path.display(),
            scene.meshes.len(),
            scene.vertex_count(),
            scene.face_count()
        );

        let handle = AssetHandle::new(AssetId(self.next_id));
        self.next_id += 1;
        self.scenes.insert(handle.id(), scene);
        self.path_to_scene.insert((full_path, steps), handle);

        Ok(handle)
    }

    /// Import in-memory data as if read from `path`, without caching.
    pub fn import_bytes(
        &self,
        path: &Path,
        bytes: &[u8],
        steps: PostProcessSteps,
    ) -> Result<Scene, AssetError> {
        let header = &bytes[..bytes.len().min(HEADER_LEN)];
        let importer = self
            .importers
            .find(path, header)
            .ok_or_else(|| AssetError::NoImporter(path.to_path_buf()))?;

        let mut scene = importer.parse(bytes).map_err(|source| AssetError::Parse {
            importer: importer.name(),
            path: path.to_path_buf(),
            source,
        })?;
        self.pipeline.run(&mut scene, steps)?;
        Ok(scene)
    }

    /// Get a reference to a loaded scene by its handle.
    pub fn get_scene(&self, handle: AssetHandle<Scene>) -> Option<&Scene> {
        self.scenes.get(&handle.id())
    }

    pub fn is_loaded(&self, handle: AssetHandle<Scene>) -> bool {
        self.scenes.contains_key(&handle.id())
    }

    /// Drop a scene and every cache entry pointing at it.
    pub fn unload(&mut self, handle: AssetHandle<Scene>) -> Option<Scene> {
        self.path_to_scene.retain(|_, h| *h != handle);
        self.scenes.remove(&handle.id())
    }

    /// The base path this server resolves relative paths against.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use mosaic_scene::{Face, Mesh, PrimitiveTypes};

    use crate::error::ParseError;

    /// One polygon per file, one "x y z" vertex per line.
    struct PolygonImporter;

    impl Importer for PolygonImporter {
        fn name(&self) -> &'static str {
            "polygon"
        }

        fn extensions(&self) -> &'static [&'static str] {
            &["poly"]
        }

        fn parse(&self, bytes: &[u8]) -> Result<Scene, ParseError> {
            let text = std::str::from_utf8(bytes).map_err(|e| ParseError::new(e.to_string()))?;
            let positions = text
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(|line| {
                    let v: Vec<f32> = line
                        .split_whitespace()
                        .map(|t| t.parse::<f32>().map_err(|e| ParseError::new(e.to_string())))
                        .collect::<Result<_, _>>()?;
                    match v[..] {
                        [x, y, z] => Ok(Vec3::new(x, y, z)),
                        _ => Err(ParseError::new(format!("expected 3 coordinates: {line}"))),
                    }
                })
                .collect::<Result<Vec<_>, _>>()?;

            let indices = (0..positions.len() as u32).collect();
            let mut scene = Scene::new("polygon");
            scene.add_mesh(Mesh::new("polygon", positions).with_faces(vec![Face::new(indices)]));
            scene.nodes.root_node_mut().meshes.push(0);
            Ok(scene)
        }
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("mosaic-assets-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn server_with_pentagon(name: &str) -> AssetServer {
        let dir = temp_dir(name);
        fs::write(
            dir.join("pentagon.poly"),
            "1 0 0\n0.309 0.951 0\n-0.809 0.588 0\n-0.809 -0.588 0\n0.309 -0.951 0\n",
        )
        .unwrap();
        let mut server = AssetServer::new(dir);
        server.register_importer(PolygonImporter);
        server
    }

    #[test]
    fn missing_file_returns_error() {
        let mut server = AssetServer::new("/nonexistent");
        let result = server.load_scene(Path::new("does_not_exist.poly"), PostProcessSteps::empty());
        match result.unwrap_err() {
            AssetError::NotFound(_) => {}
            other => panic!("expected NotFound, got: {:?}", other),
        }
    }

    #[test]
    fn resolve_relative_path() {
        let server = AssetServer::new("/home/user/assets");
        assert_eq!(
            server.resolve(Path::new("models/box.poly")),
            PathBuf::from("/home/user/assets/models/box.poly")
        );
        assert_eq!(
            server.resolve(Path::new("/absolute/box.poly")),
            PathBuf::from("/absolute/box.poly")
        );
    }

    #[test]
    fn load_runs_selected_steps_and_caches() {
        let mut server = server_with_pentagon("cache");
        let path = Path::new("pentagon.poly");

        let triangulated = server.load_scene(path, PostProcessSteps::TRIANGULATE).unwrap();
        let scene = server.get_scene(triangulated).unwrap();
        assert_eq!(scene.meshes[0].faces.len(), 3);
        assert_eq!(scene.meshes[0].primitive_types, PrimitiveTypes::TRIANGLE);

        assert_eq!(server.load_scene(path, PostProcessSteps::TRIANGULATE).unwrap(), triangulated);

        let raw = server.load_scene(path, PostProcessSteps::empty()).unwrap();
        assert_ne!(raw, triangulated);
        assert_eq!(server.get_scene(raw).unwrap().meshes[0].faces.len(), 1);

        assert!(server.unload(triangulated).is_some());
        assert!(!server.is_loaded(triangulated));
    }

    #[test]
    fn config_change_reprocesses_cached_paths() {
        let mut server = server_with_pentagon("config");
        let path = Path::new("pentagon.poly");
        let steps = PostProcessSteps::PRE_TRANSFORM_VERTICES;

        let plain = server.load_scene(path, steps).unwrap();
        let mut config = ProcessConfig::default();
        config.pretransform.root_transformation = Some(glam::Mat4::from_translation(Vec3::Z));
        server.set_process_config(&config);

        let moved = server.load_scene(path, steps).unwrap();
        assert_ne!(moved, plain);
        assert_eq!(server.get_scene(plain).unwrap().meshes[0].positions[0], Vec3::X);
        assert_eq!(
            server.get_scene(moved).unwrap().meshes[0].positions[0],
            Vec3::new(1.0, 0.0, 1.0)
        );
        assert_eq!(server.load_scene(path, steps).unwrap(), moved);
    }

    #[test]
    fn unknown_format_and_parse_errors() {
        let server = server_with_pentagon("errors");
        let err = server
            .import_bytes(Path::new("scene.xyz"), b"whatever", PostProcessSteps::empty())
            .unwrap_err();
        assert!(matches!(err, AssetError::NoImporter(_)));

        let err = server
            .import_bytes(Path::new("bad.poly"), b"1 2\n", PostProcessSteps::empty())
            .unwrap_err();
        assert!(matches!(err, AssetError::Parse { importer: "polygon", .. }));
    }

    #[test]
    fn processing_errors_are_reported() {
        let server = server_with_pentagon("process");
        // An empty file yields a polygon without indices.
        let err = server
            .import_bytes(Path::new("empty.poly"), b"", PostProcessSteps::VALIDATE_DATA_STRUCTURE)
            .unwrap_err();
        assert!(matches!(err, AssetError::Process(_)));
    }
}
