use std::collections::BTreeMap;

use crate::{
    anchor::{AnchorSpec, PlacedBox, PlacementLedger, resolve_position},
    artifact::RasterArtifact,
    blend_cpu::blit_over,
    error::{LayerKitError, LayerKitResult},
};

/// Blend mode of a composited layer.
///
/// Only `Normal` has dedicated blend math today; the other modes are accepted
/// in specs and currently composite as `Normal`. Kept as a closed enum so
/// unknown mode names are rejected at deserialization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
}

/// One entry in a composite stack. The first (root) layer carries no anchor
/// and defines the canvas size; every later layer must carry one.
#[derive(Clone, Debug)]
pub struct Layer {
    pub image: RasterArtifact,
    pub anchor: Option<AnchorSpec>,
    /// Stable id; required only when later layers anchor relative to this one.
    pub id: Option<String>,
    pub opacity: f32,
    pub blend: BlendMode,
}

impl Layer {
    pub fn root(image: RasterArtifact) -> Self {
        Self {
            image,
            anchor: None,
            id: None,
            opacity: 1.0,
            blend: BlendMode::default(),
        }
    }

    pub fn anchored(image: RasterArtifact, anchor: AnchorSpec) -> Self {
        Self {
            image,
            anchor: Some(anchor),
            id: None,
            opacity: 1.0,
            blend: BlendMode::default(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }
}

/// Alpha-composites an ordered stack of layers onto a transparent canvas
/// sized to the root layer. List order is the z-order; no topology is
/// inferred. Each placed layer with a stable id is recorded in the placement
/// ledger and becomes available to later layers' relative anchors.
#[tracing::instrument(skip(layers), fields(layer_count = layers.len()))]
pub fn composite(layers: &[Layer]) -> LayerKitResult<RasterArtifact> {
    let root = layers.first().ok_or_else(|| {
        LayerKitError::configuration("composite requires at least one layer")
    })?;
    if root.anchor.is_some() {
        return Err(LayerKitError::configuration(
            "root layer must not carry an anchor; it defines the canvas at the origin",
        ));
    }
    for (idx, layer) in layers.iter().enumerate().skip(1) {
        if layer.anchor.is_none() {
            return Err(LayerKitError::configuration(format!(
                "layer {idx} must carry an anchor (only the root layer goes without one)"
            )));
        }
    }

    let width = root.image.width();
    let height = root.image.height();
    tracing::debug!(width, height, "compositing onto root-sized canvas");

    let mut canvas = image::RgbaImage::new(width, height);
    let mut placed = PlacementLedger::new();

    for layer in layers {
        let size = (layer.image.width(), layer.image.height());
        let (x, y) = match &layer.anchor {
            None => (0, 0),
            Some(anchor) => resolve_position(anchor, size, &placed)?,
        };

        if layer.blend != BlendMode::Normal {
            tracing::debug!(blend = ?layer.blend, "blend mode not implemented, compositing as normal");
        }
        blit_over(&mut canvas, layer.image.pixels(), x, y, layer.opacity);

        if let Some(id) = &layer.id {
            placed.insert(
                id.clone(),
                PlacedBox {
                    x,
                    y,
                    width: size.0,
                    height: size.1,
                },
            );
        }
    }

    Ok(RasterArtifact::new(canvas))
}

/// Legacy z-order reconstruction from a map of layer id to anchor, kept for
/// compatibility with specs authored before the explicit-list contract.
///
/// The map is treated as a directed structure: exactly one anchor-less root,
/// every other layer reachable from it through relative parent pointers, and
/// at most one child per layer. Shared parents are ambiguous here (the
/// explicit list contract exists precisely to avoid that) and are rejected.
pub fn chain_order(anchors: &BTreeMap<String, Option<AnchorSpec>>) -> LayerKitResult<Vec<String>> {
    let roots: Vec<&String> = anchors
        .iter()
        .filter(|(_, a)| a.is_none())
        .map(|(id, _)| id)
        .collect();
    let root = match roots.as_slice() {
        [] => {
            return Err(LayerKitError::missing_dependency(
                "chain ordering requires exactly one anchor-less root layer, found none",
            ));
        }
        [root] => (*root).clone(),
        many => {
            return Err(LayerKitError::ambiguity(format!(
                "chain ordering found {} anchor-less root candidates: {}",
                many.len(),
                many.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
            )));
        }
    };

    let mut children: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (id, anchor) in anchors {
        match anchor {
            None => {}
            Some(AnchorSpec::Relative { parent, .. }) => {
                if !anchors.contains_key(parent) {
                    return Err(LayerKitError::missing_dependency(format!(
                        "layer '{id}' references parent '{parent}' which is not in the layer map"
                    )));
                }
                children.entry(parent.as_str()).or_default().push(id.as_str());
            }
            Some(AnchorSpec::Absolute { .. }) => {
                return Err(LayerKitError::configuration(format!(
                    "layer '{id}' has an absolute anchor; chain ordering is only defined for a \
                     linear chain of relative anchors"
                )));
            }
        }
    }

    let mut order = vec![root.clone()];
    let mut cursor = root;
    while let Some(kids) = children.get(cursor.as_str()) {
        match kids.as_slice() {
            [next] => {
                order.push((*next).to_string());
                cursor = (*next).to_string();
            }
            many => {
                return Err(LayerKitError::ambiguity(format!(
                    "layers {} all anchor to parent '{cursor}'; z-order between siblings is \
                     undefined, use an explicit layer list instead",
                    many.iter().map(|s| format!("'{s}'")).collect::<Vec<_>>().join(", ")
                )));
            }
        }
    }

    if order.len() != anchors.len() {
        let missing: Vec<&str> = anchors
            .keys()
            .map(|s| s.as_str())
            .filter(|id| !order.iter().any(|o| o == id))
            .collect();
        return Err(LayerKitError::configuration(format!(
            "layers not reachable from root chain: {}",
            missing.join(", ")
        )));
    }

    Ok(order)
}
