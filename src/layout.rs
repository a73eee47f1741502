use crate::{
    anchor::AxisAlign,
    artifact::RasterArtifact,
    blend_cpu::blit_over,
    error::{LayerKitError, LayerKitResult},
};

/// Main-axis direction of a flow layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowDirection {
    Row,
    Column,
}

/// Flow layout parameters: items are laid out along the main axis in order,
/// separated by `gap` pixels, and aligned on the cross axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LayoutSpec {
    pub direction: FlowDirection,
    pub align: AxisAlign,
    pub gap: u32,
}

/// Arranges raster items into a tightly sized transparent canvas.
///
/// Main-axis extent is the sum of item extents plus `gap` between neighbors;
/// cross-axis extent is the largest item. Both must end up strictly positive.
#[tracing::instrument(skip(items), fields(item_count = items.len()))]
pub fn layout(spec: &LayoutSpec, items: &[RasterArtifact]) -> LayerKitResult<RasterArtifact> {
    if items.is_empty() {
        return Err(LayerKitError::configuration(
            "layout requires at least one item",
        ));
    }

    let gap = spec.gap as u64;
    let gaps_total = gap * (items.len() as u64 - 1);
    let (width, height) = match spec.direction {
        FlowDirection::Row => (
            items.iter().map(|a| a.width() as u64).sum::<u64>() + gaps_total,
            items.iter().map(|a| a.height() as u64).max().unwrap_or(0),
        ),
        FlowDirection::Column => (
            items.iter().map(|a| a.width() as u64).max().unwrap_or(0),
            items.iter().map(|a| a.height() as u64).sum::<u64>() + gaps_total,
        ),
    };
    if width == 0 || height == 0 {
        return Err(LayerKitError::configuration(format!(
            "layout dimensions {width}x{height} are not strictly positive; \
             every item needs positive extents"
        )));
    }
    let width = u32::try_from(width).map_err(|_| {
        LayerKitError::configuration(format!("layout width {width} exceeds u32 range"))
    })?;
    let height = u32::try_from(height).map_err(|_| {
        LayerKitError::configuration(format!("layout height {height} exceeds u32 range"))
    })?;
    tracing::debug!(width, height, "flow layout canvas");

    let mut canvas = image::RgbaImage::new(width, height);
    let mut cursor: i64 = 0;
    for item in items {
        let (x, y) = match spec.direction {
            FlowDirection::Row => (
                cursor,
                i64::from(cross_offset(spec.align, height, item.height())),
            ),
            FlowDirection::Column => (
                i64::from(cross_offset(spec.align, width, item.width())),
                cursor,
            ),
        };
        blit_over(&mut canvas, item.pixels(), x as i32, y as i32, 1.0);
        cursor += gap as i64
            + match spec.direction {
                FlowDirection::Row => i64::from(item.width()),
                FlowDirection::Column => i64::from(item.height()),
            };
    }

    Ok(RasterArtifact::new(canvas))
}

fn cross_offset(align: AxisAlign, extent: u32, item_extent: u32) -> i32 {
    let free = extent as i32 - item_extent as i32;
    match align {
        AxisAlign::Start => 0,
        AxisAlign::Center => free / 2,
        AxisAlign::End => free,
    }
}
