use mosaic_scene::{Scene, SceneFlags};
use tracing::{debug, warn};

use crate::error::ProcessError;
use crate::step::{PostProcessSteps, ProcessStep};

const STEP: &str = "ValidateDataStructure";

/// Checks the structural scene invariants and marks the scene as validated.
///
/// Meshes without faces are tolerated but flag the scene with
/// [`SceneFlags::VALIDATION_WARNING`].
#[derive(Debug, Default)]
pub struct ValidateDataStructure;

impl ProcessStep for ValidateDataStructure {
    fn name(&self) -> &'static str {
        STEP
    }

    fn is_active(&self, steps: PostProcessSteps) -> bool {
        steps.contains(PostProcessSteps::VALIDATE_DATA_STRUCTURE)
    }

    fn execute(&self, scene: &mut Scene) -> Result<(), ProcessError> {
        debug!("ValidateDataStructure begin");
        scene
            .validate()
            .map_err(|e| ProcessError::invalid_scene(STEP, e))?;

        for (index, mesh) in scene.meshes.iter().enumerate() {
            if !mesh.has_faces() {
                warn!("Mesh {} ({}) has no faces", index, mesh.name);
                scene.flags |= SceneFlags::VALIDATION_WARNING;
            }
        }
        scene.flags |= SceneFlags::VALIDATED;
        debug!("ValidateDataStructure finished");
        Ok(())
    }
}
