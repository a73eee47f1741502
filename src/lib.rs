//! Layerkit composes raster images from smaller visual artifacts using two
//! declarative primitives: anchor-based compositing onto a fixed canvas, and
//! content-sized flow layout.
//!
//! Every operation is a synchronous pure function over immutable inputs, and
//! identical inputs always yield byte-identical canonical output. That
//! determinism is a hard contract: these operations run as nodes inside
//! content-addressed computation graphs whose cache correctness depends on
//! reproducible pixels.
//!
//! # Building blocks
//!
//! 1. **Artifacts**: [`RasterArtifact`] (RGBA8 pixels, canonical PNG form,
//!    SHA-256 content hash) and [`BlobArtifact`] (tagged raw bytes).
//! 2. **Compositing**: [`composite()`] alpha-blends an ordered layer stack
//!    onto a canvas sized by the root layer; later layers may anchor relative
//!    to earlier ones via the placement ledger.
//! 3. **Flow layout**: [`layout()`] arranges items along one axis into a
//!    tight transparent canvas.
//! 4. **Recipes**: multi-step effects like [`drop_shadow()`] are emitted as
//!    self-contained [`SubGraph`] fragments with one input and one output.
#![forbid(unsafe_code)]

pub mod anchor;
pub mod artifact;
pub mod blend_cpu;
pub mod blur_cpu;
pub mod composite;
pub mod error;
pub mod graph;
pub mod layout;
pub mod ops;
pub mod recipes;

pub use anchor::{
    Alignment, AnchorSpec, AxisAlign, PlacedBox, PlacementLedger, absolute, relative,
    relative_offset, resolve_position,
};
pub use artifact::{BlobArtifact, RasterArtifact};
pub use composite::{BlendMode, Layer, chain_order, composite};
pub use error::{LayerKitError, LayerKitResult};
pub use graph::{Op, SubGraph, ValueRef};
pub use layout::{FlowDirection, LayoutSpec, layout};
pub use recipes::{DropShadowParams, SHADOW_SOURCE, drop_shadow};
