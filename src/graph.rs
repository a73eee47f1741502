//! Self-contained graph fragments for reusable multi-step effects.
//!
//! A [`SubGraph`] bundles named elementary operations behind one input
//! placeholder and one designated output node, so a whole effect can be
//! nested into a larger pipeline as a single unit. Operations bind their
//! inputs by explicit name ([`ValueRef`] fields), never by scanning runtime
//! types. Evaluation here is pure and synchronous; scheduling and caching
//! belong to the execution engine hosting the fragment.

use std::collections::BTreeMap;

use crate::{
    artifact::RasterArtifact,
    error::{LayerKitError, LayerKitResult},
    ops,
};

/// Named reference to another node's output, or to the fragment's input
/// placeholder.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ValueRef(String);

impl ValueRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

/// One elementary operation with statically named input bindings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    ExtractAlpha {
        image: ValueRef,
    },
    Pad {
        image: ValueRef,
        left: u32,
        top: u32,
        right: u32,
        bottom: u32,
    },
    Dilate {
        image: ValueRef,
        radius: u32,
    },
    GaussianBlur {
        image: ValueRef,
        sigma: f64,
    },
    Colorize {
        image: ValueRef,
        color: [u8; 4],
    },
    Translate {
        image: ValueRef,
        dx: i32,
        dy: i32,
    },
}

impl Op {
    fn image_input(&self) -> &ValueRef {
        match self {
            Op::ExtractAlpha { image }
            | Op::Pad { image, .. }
            | Op::Dilate { image, .. }
            | Op::GaussianBlur { image, .. }
            | Op::Colorize { image, .. }
            | Op::Translate { image, .. } => image,
        }
    }

    fn apply(&self, image: &RasterArtifact) -> LayerKitResult<RasterArtifact> {
        match self {
            Op::ExtractAlpha { .. } => ops::extract_alpha(image),
            Op::Pad {
                left,
                top,
                right,
                bottom,
                ..
            } => ops::pad(image, *left, *top, *right, *bottom),
            Op::Dilate { radius, .. } => ops::dilate(image, *radius),
            Op::GaussianBlur { sigma, .. } => ops::gaussian_blur(image, *sigma),
            Op::Colorize { color, .. } => ops::colorize(image, *color),
            Op::Translate { dx, dy, .. } => ops::translate(image, *dx, *dy),
        }
    }
}

/// An isolated sub-pipeline: named nodes, one input placeholder, one
/// designated output node.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SubGraph {
    /// Name the fragment's external input binds to inside the fragment.
    pub input: String,
    pub nodes: BTreeMap<String, Op>,
    pub output: String,
}

impl SubGraph {
    /// Structural checks, independent of any input artifact.
    pub fn validate(&self) -> LayerKitResult<()> {
        if self.nodes.contains_key(&self.input) {
            return Err(LayerKitError::ambiguity(format!(
                "node id '{}' shadows the input placeholder",
                self.input
            )));
        }
        if !self.nodes.contains_key(&self.output) {
            return Err(LayerKitError::missing_dependency(format!(
                "designated output '{}' is not a node in the fragment",
                self.output
            )));
        }
        for (id, op) in &self.nodes {
            let target = op.image_input().id();
            if target != self.input && !self.nodes.contains_key(target) {
                return Err(LayerKitError::missing_dependency(format!(
                    "node '{id}' references '{target}' which is neither a node nor the input \
                     placeholder '{}'",
                    self.input
                )));
            }
        }
        Ok(())
    }

    /// Runs the fragment against one source artifact. Pure: no caching, no
    /// scheduling, node results are materialized at most once.
    #[tracing::instrument(skip(self, source), fields(node_count = self.nodes.len()))]
    pub fn evaluate(&self, source: &RasterArtifact) -> LayerKitResult<RasterArtifact> {
        self.validate()?;
        let mut done = BTreeMap::<String, RasterArtifact>::new();
        let mut visiting = Vec::<String>::new();
        self.resolve(&self.output, source, &mut done, &mut visiting)
    }

    fn resolve(
        &self,
        id: &str,
        source: &RasterArtifact,
        done: &mut BTreeMap<String, RasterArtifact>,
        visiting: &mut Vec<String>,
    ) -> LayerKitResult<RasterArtifact> {
        if id == self.input {
            return Ok(source.clone());
        }
        if let Some(found) = done.get(id) {
            return Ok(found.clone());
        }
        if visiting.iter().any(|v| v == id) {
            return Err(LayerKitError::configuration(format!(
                "reference cycle through node '{id}'"
            )));
        }

        let op = self.nodes.get(id).ok_or_else(|| {
            LayerKitError::missing_dependency(format!("no node named '{id}' in the fragment"))
        })?;

        visiting.push(id.to_string());
        let input = self.resolve(op.image_input().id(), source, done, visiting)?;
        visiting.pop();

        let result = op.apply(&input)?;
        done.insert(id.to_string(), result.clone());
        Ok(result)
    }
}
