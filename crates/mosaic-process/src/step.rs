use mosaic_scene::Scene;

use crate::config::ProcessConfig;
use crate::error::ProcessError;

bitflags::bitflags! {
    /// Selects which steps a pipeline run executes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PostProcessSteps: u32 {
        const VALIDATE_DATA_STRUCTURE = 0x1;
        const PRE_TRANSFORM_VERTICES = 0x2;
        const TRIANGULATE = 0x4;
        const JOIN_IDENTICAL_VERTICES = 0x8;
    }
}

/// A post-processing step that mutates a scene in place.
///
/// `execute` either fully establishes the step's postcondition or returns an
/// error without having modified the scene.
pub trait ProcessStep: Send + Sync {
    /// Short name used in logs and error reports.
    fn name(&self) -> &'static str;

    /// Whether this step is selected by `steps`.
    fn is_active(&self, steps: PostProcessSteps) -> bool;

    /// Read configuration before `execute` is called.
    fn setup(&mut self, _config: &ProcessConfig) {}

    fn execute(&self, scene: &mut Scene) -> Result<(), ProcessError>;
}
