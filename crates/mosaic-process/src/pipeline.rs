use mosaic_scene::Scene;
use tracing::{debug, warn};

use crate::config::ProcessConfig;
use crate::error::ProcessError;
use crate::join_vertices::JoinVerticesProcess;
use crate::preprocess::ScenePreprocessor;
use crate::pretransform::PretransformVertices;
use crate::step::{PostProcessSteps, ProcessStep};
use crate::triangulate::TriangulateProcess;
use crate::validate::ValidateDataStructure;

/// An ordered list of processing steps run over one scene.
pub struct Pipeline {
    steps: Vec<Box<dyn ProcessStep>>,
}

impl Pipeline {
    /// An empty pipeline.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Every built-in step, in execution order.
    pub fn standard() -> Self {
        let mut pipeline = Self::new();
        pipeline.add_step(ValidateDataStructure);
        pipeline.add_step(PretransformVertices::new());
        pipeline.add_step(TriangulateProcess::new());
        pipeline.add_step(JoinVerticesProcess::new());
        pipeline
    }

    /// Built-in steps configured from `config`.
    pub fn with_config(config: &ProcessConfig) -> Self {
        let mut pipeline = Self::standard();
        pipeline.setup(config);
        pipeline
    }

    /// Add a step to the end of the pipeline.
    pub fn add_step<S: ProcessStep + 'static>(&mut self, step: S) {
        self.steps.push(Box::new(step));
    }

    /// Hand `config` to every step.
    pub fn setup(&mut self, config: &ProcessConfig) {
        for step in &mut self.steps {
            step.setup(config);
        }
    }

    /// Preprocess `scene`, then run each step selected by `flags` in order.
    ///
    /// Work happens on a copy that replaces `scene` only once every step has
    /// succeeded. On the first failing step the run stops and `scene` is left
    /// exactly as it was passed in, preprocessing included.
    pub fn run(&self, scene: &mut Scene, flags: PostProcessSteps) -> Result<(), ProcessError> {
        let mut working = scene.clone();
        ScenePreprocessor.process(&mut working);

        for step in self.steps.iter().filter(|s| s.is_active(flags)) {
            debug!("Running {}", step.name());
            if let Err(e) = step.execute(&mut working) {
                warn!("{} failed: {}", step.name(), e);
                return Err(e);
            }
        }
        *scene = working;
        Ok(())
    }

    /// Names of the steps in execution order.
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Number of steps in the pipeline.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::standard()
    }
}

/// Run the built-in steps selected by `flags` over `scene`.
pub fn process_scene(
    scene: &mut Scene,
    flags: PostProcessSteps,
    config: &ProcessConfig,
) -> Result<(), ProcessError> {
    Pipeline::with_config(config).run(scene, flags)
}
