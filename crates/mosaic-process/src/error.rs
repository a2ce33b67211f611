use std::fmt;

use mosaic_scene::{NodeId, SceneError};

/// What part of the scene a processing error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessTarget {
    Scene,
    Mesh(usize),
    Node(NodeId),
}

impl fmt::Display for ProcessTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessTarget::Scene => write!(f, "scene"),
            ProcessTarget::Mesh(index) => write!(f, "mesh {index}"),
            ProcessTarget::Node(id) => write!(f, "node {id}"),
        }
    }
}

/// Why a violated precondition was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Violation {
    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error("{0}")]
    Other(String),
}

/// Errors a processing step can report. A failed step leaves the scene as it was.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProcessError {
    #[error("{step}: precondition violated for {target}: {violation}")]
    PreconditionViolation {
        step: &'static str,
        target: ProcessTarget,
        #[source]
        violation: Violation,
    },

    #[error("{step}: resource limit exceeded for {target}: {detail}")]
    ResourceLimit {
        step: &'static str,
        target: ProcessTarget,
        detail: String,
    },
}

impl ProcessError {
    pub fn precondition(step: &'static str, target: ProcessTarget, detail: impl Into<String>) -> Self {
        Self::PreconditionViolation {
            step,
            target,
            violation: Violation::Other(detail.into()),
        }
    }

    /// Wrap a failed invariant check, targeting the mesh or node it names.
    pub fn invalid_scene(step: &'static str, error: SceneError) -> Self {
        let target = match &error {
            SceneError::ChannelLength { mesh, .. }
            | SceneError::EmptyFace { mesh, .. }
            | SceneError::FaceIndexOutOfRange { mesh, .. }
            | SceneError::MaterialIndexOutOfRange { mesh, .. }
            | SceneError::BoneWeightOutOfRange { mesh, .. } => ProcessTarget::Mesh(*mesh),
            SceneError::MeshReferenceOutOfRange { node, .. }
            | SceneError::ParentMismatch { node, .. } => ProcessTarget::Node(*node),
            SceneError::UnknownNode(node)
            | SceneError::HierarchyCycle(node)
            | SceneError::DetachedNode(node) => ProcessTarget::Node(*node),
            SceneError::AmbiguousBoneNode { .. } => ProcessTarget::Scene,
        };
        Self::PreconditionViolation {
            step,
            target,
            violation: Violation::Scene(error),
        }
    }

    pub fn resource_limit(step: &'static str, target: ProcessTarget, detail: impl Into<String>) -> Self {
        Self::ResourceLimit {
            step,
            target,
            detail: detail.into(),
        }
    }

    /// Name of the step that failed.
    pub fn step(&self) -> &'static str {
        match self {
            Self::PreconditionViolation { step, .. } | Self::ResourceLimit { step, .. } => step,
        }
    }

    pub fn target(&self) -> ProcessTarget {
        match self {
            Self::PreconditionViolation { target, .. } | Self::ResourceLimit { target, .. } => *target,
        }
    }
}
