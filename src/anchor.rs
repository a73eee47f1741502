use std::collections::BTreeMap;

use crate::error::{LayerKitError, LayerKitResult};

/// Alignment code for one axis: which edge or midpoint of a box to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AxisAlign {
    #[serde(rename = "s")]
    Start,
    #[serde(rename = "c")]
    Center,
    #[serde(rename = "e")]
    End,
}

impl AxisAlign {
    fn from_char(c: char, side: &str) -> LayerKitResult<Self> {
        match c {
            's' => Ok(Self::Start),
            'c' => Ok(Self::Center),
            'e' => Ok(Self::End),
            _ => Err(LayerKitError::configuration(format!(
                "{side} alignment char must be 's', 'c', or 'e', got '{c}'"
            ))),
        }
    }

    /// Offset of the alignment point from the box origin, on one axis.
    fn point_offset(self, size: u32) -> i32 {
        match self {
            Self::Start => 0,
            Self::Center => (size / 2) as i32,
            Self::End => size as i32,
        }
    }
}

/// Parsed form of the `"<self>@<parent>"` alignment grammar.
///
/// Each side is one or two characters drawn from `{s, c, e}`: a single
/// character applies to both axes, two characters assign (horizontal,
/// vertical) respectively.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Alignment {
    pub self_x: AxisAlign,
    pub self_y: AxisAlign,
    pub parent_x: AxisAlign,
    pub parent_y: AxisAlign,
}

impl Alignment {
    pub fn parse(s: &str) -> LayerKitResult<Self> {
        let mut parts = s.split('@');
        let (self_str, parent_str) = match (parts.next(), parts.next(), parts.next()) {
            (Some(a), Some(b), None) => (a.trim(), b.trim()),
            (_, None, _) => {
                return Err(LayerKitError::configuration(format!(
                    "alignment '{s}' must use the '@' separator, as in 'c@c'"
                )));
            }
            _ => {
                return Err(LayerKitError::configuration(format!(
                    "alignment '{s}' must be exactly '<self>@<parent>'"
                )));
            }
        };

        let (self_x, self_y) = parse_side(self_str, "self")?;
        let (parent_x, parent_y) = parse_side(parent_str, "parent")?;
        Ok(Self {
            self_x,
            self_y,
            parent_x,
            parent_y,
        })
    }
}

fn parse_side(s: &str, side: &str) -> LayerKitResult<(AxisAlign, AxisAlign)> {
    let chars: Vec<char> = s.chars().collect();
    match chars.as_slice() {
        [both] => {
            let a = AxisAlign::from_char(*both, side)?;
            Ok((a, a))
        }
        [x, y] => Ok((
            AxisAlign::from_char(*x, side)?,
            AxisAlign::from_char(*y, side)?,
        )),
        _ => Err(LayerKitError::configuration(format!(
            "{side} alignment must be 1-2 chars, got '{s}'"
        ))),
    }
}

/// Declarative positioning rule for a composited layer.
///
/// Coordinates are integer pixels; any symbolic expressions are resolved by
/// the execution engine before specs reach this crate.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnchorSpec {
    Absolute {
        x: i32,
        y: i32,
    },
    Relative {
        parent: String,
        /// Alignment grammar string, kept as authored so specs serialize
        /// exactly; validated when the anchor is resolved.
        align: String,
        #[serde(default)]
        x: i32,
        #[serde(default)]
        y: i32,
    },
}

/// Place a layer at absolute pixel coordinates on the canvas.
pub fn absolute(x: i32, y: i32) -> AnchorSpec {
    AnchorSpec::Absolute { x, y }
}

/// Position a layer relative to a previously placed layer, zero offset.
pub fn relative(parent: impl Into<String>, align: impl Into<String>) -> AnchorSpec {
    relative_offset(parent, align, 0, 0)
}

/// Position a layer relative to a previously placed layer, with a pixel offset.
pub fn relative_offset(
    parent: impl Into<String>,
    align: impl Into<String>,
    x: i32,
    y: i32,
) -> AnchorSpec {
    AnchorSpec::Relative {
        parent: parent.into(),
        align: align.into(),
        x,
        y,
    }
}

/// Recorded box of an already composited layer, keyed by stable id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacedBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Placement ledger: stable layer id -> recorded box.
pub type PlacementLedger = BTreeMap<String, PlacedBox>;

/// Resolves an anchor to the top-left pixel coordinate of a box of
/// `self_size`. Absolute anchors pass through unclamped; relative anchors
/// place the self box so its alignment point coincides with the parent's,
/// then shift by the explicit offset.
pub fn resolve_position(
    anchor: &AnchorSpec,
    self_size: (u32, u32),
    placed: &PlacementLedger,
) -> LayerKitResult<(i32, i32)> {
    match anchor {
        AnchorSpec::Absolute { x, y } => Ok((*x, *y)),
        AnchorSpec::Relative {
            parent,
            align,
            x,
            y,
        } => {
            let parent_box = placed.get(parent).ok_or_else(|| {
                LayerKitError::missing_dependency(format!(
                    "relative anchor references parent '{parent}' which has not been placed; \
                     the parent layer needs a stable id and must appear earlier in the stack"
                ))
            })?;
            let align = Alignment::parse(align)?;
            Ok((
                axis_position(
                    align.self_x,
                    align.parent_x,
                    self_size.0,
                    parent_box.x,
                    parent_box.width,
                    *x,
                ),
                axis_position(
                    align.self_y,
                    align.parent_y,
                    self_size.1,
                    parent_box.y,
                    parent_box.height,
                    *y,
                ),
            ))
        }
    }
}

fn axis_position(
    self_align: AxisAlign,
    parent_align: AxisAlign,
    self_size: u32,
    parent_origin: i32,
    parent_size: u32,
    offset: i32,
) -> i32 {
    let parent_point = parent_origin + parent_align.point_offset(parent_size);
    parent_point - self_align.point_offset(self_size) + offset
}
