//! Reusable effect recipes, each built as a private chain of elementary
//! operations and exposed as a single [`SubGraph`] unit.

use std::collections::BTreeMap;

use crate::{
    blur_cpu::kernel_radius,
    error::{LayerKitError, LayerKitResult},
    graph::{Op, SubGraph, ValueRef},
};

/// Name of the drop-shadow fragment's single external input slot.
pub const SHADOW_SOURCE: &str = "source";

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DropShadowParams {
    /// Horizontal shadow offset, positive moves right.
    pub dx: i32,
    /// Vertical shadow offset, positive moves down.
    pub dy: i32,
    /// Spread radius: dilates the silhouette before blurring.
    pub spread: u32,
    /// Blur standard deviation.
    pub sigma: f64,
    /// Shadow color, straight RGBA.
    pub color: [u8; 4],
}

impl Default for DropShadowParams {
    fn default() -> Self {
        Self {
            dx: 2,
            dy: 2,
            spread: 0,
            sigma: 3.0,
            color: [0, 0, 0, 180],
        }
    }
}

/// Builds the drop-shadow fragment: extract-alpha, pad, optional dilate,
/// optional blur, colorize, optional translate. Steps whose parameter is a
/// no-op are omitted so simple invocations emit minimal sub-pipelines.
///
/// The pad amount is `ceil(3 * sigma) + spread`, which is exactly the blur
/// kernel's sampling radius plus the spread growth, so nothing visible is
/// clipped downstream.
pub fn drop_shadow(params: &DropShadowParams) -> LayerKitResult<SubGraph> {
    if !params.sigma.is_finite() || params.sigma < 0.0 {
        return Err(LayerKitError::configuration(format!(
            "drop shadow sigma must be finite and >= 0, got {}",
            params.sigma
        )));
    }

    let mut nodes = BTreeMap::<String, Op>::new();
    let mut prev = ValueRef::new(SHADOW_SOURCE);

    nodes.insert("alpha".to_string(), Op::ExtractAlpha { image: prev });
    prev = ValueRef::new("alpha");

    let pad = kernel_radius(params.sigma) + params.spread;
    if pad > 0 {
        nodes.insert(
            "padded".to_string(),
            Op::Pad {
                image: prev,
                left: pad,
                top: pad,
                right: pad,
                bottom: pad,
            },
        );
        prev = ValueRef::new("padded");
    }

    if params.spread > 0 {
        nodes.insert(
            "dilated".to_string(),
            Op::Dilate {
                image: prev,
                radius: params.spread,
            },
        );
        prev = ValueRef::new("dilated");
    }

    if params.sigma > 0.0 {
        nodes.insert(
            "blurred".to_string(),
            Op::GaussianBlur {
                image: prev,
                sigma: params.sigma,
            },
        );
        prev = ValueRef::new("blurred");
    }

    nodes.insert(
        "colored".to_string(),
        Op::Colorize {
            image: prev,
            color: params.color,
        },
    );
    prev = ValueRef::new("colored");

    if params.dx != 0 || params.dy != 0 {
        nodes.insert(
            "offset".to_string(),
            Op::Translate {
                image: prev,
                dx: params.dx,
                dy: params.dy,
            },
        );
        prev = ValueRef::new("offset");
    }

    Ok(SubGraph {
        input: SHADOW_SOURCE.to_string(),
        nodes,
        output: prev.id().to_string(),
    })
}
