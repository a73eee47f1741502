use layerkit::{
    AxisAlign, BlobArtifact, DropShadowParams, FlowDirection, Layer, LayoutSpec, RasterArtifact,
    absolute, composite, drop_shadow, layout, relative, relative_offset,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn solid(w: u32, h: u32, rgba: [u8; 4]) -> RasterArtifact {
    layerkit::ops::create_solid(w, h, rgba).unwrap()
}

/// Badge pipeline: swatches flow into a strip, the strip gets a drop shadow,
/// and shadow plus strip are anchored onto a background card.
fn render_badge() -> RasterArtifact {
    let swatches = vec![
        solid(20, 30, [220, 60, 60, 255]),
        solid(20, 20, [60, 220, 60, 255]),
        solid(20, 10, [60, 60, 220, 255]),
    ];
    let strip = layout(
        &LayoutSpec {
            direction: FlowDirection::Row,
            align: AxisAlign::Center,
            gap: 5,
        },
        &swatches,
    )
    .unwrap();

    let shadow = drop_shadow(&DropShadowParams {
        dx: 2,
        dy: 2,
        spread: 0,
        sigma: 1.5,
        color: [0, 0, 0, 150],
    })
    .unwrap()
    .evaluate(&strip)
    .unwrap();

    composite(&[
        Layer::root(solid(120, 80, [240, 240, 235, 255])).with_id("card"),
        Layer::anchored(shadow, relative("card", "c@c")).with_id("shadow"),
        Layer::anchored(strip, relative_offset("shadow", "c@c", -2, -2)),
    ])
    .unwrap()
}

#[test]
fn badge_pipeline_is_deterministic() {
    init_tracing();
    let a = render_badge();
    let b = render_badge();
    assert_eq!(a.pixels(), b.pixels());
    assert_eq!(a.content_hash().unwrap(), b.content_hash().unwrap());
    assert_eq!(a.canonical_png().unwrap(), b.canonical_png().unwrap());
}

#[test]
fn badge_survives_persistence_roundtrip() {
    init_tracing();
    let badge = render_badge();
    let bytes = badge.encode().unwrap();
    let back = RasterArtifact::decode(&bytes).unwrap();
    assert_eq!(back.content_hash().unwrap(), badge.content_hash().unwrap());
    assert_eq!((back.width(), back.height()), (badge.width(), badge.height()));
}

#[test]
fn ledger_chains_through_multiple_relative_layers() {
    init_tracing();
    // bg 40x40; a is 10x10 at bg's center; b is 4x4 hanging off a's end.
    let out = composite(&[
        Layer::root(solid(40, 40, [0, 0, 0, 255])).with_id("bg"),
        Layer::anchored(solid(10, 10, [255, 0, 0, 255]), relative("bg", "c@c")).with_id("a"),
        Layer::anchored(solid(4, 4, [0, 255, 0, 255]), relative("a", "s@e")).with_id("b"),
    ])
    .unwrap();

    // a occupies [15,25)x[15,25); b starts at a's bottom-right corner (25,25).
    assert_eq!(out.pixels().get_pixel(15, 15).0, [255, 0, 0, 255]);
    assert_eq!(out.pixels().get_pixel(24, 24).0, [255, 0, 0, 255]);
    assert_eq!(out.pixels().get_pixel(25, 25).0, [0, 255, 0, 255]);
    assert_eq!(out.pixels().get_pixel(28, 28).0, [0, 255, 0, 255]);
    assert_eq!(out.pixels().get_pixel(29, 29).0, [0, 0, 0, 255]);
}

#[test]
fn blob_sources_feed_the_raster_pipeline() {
    init_tracing();
    let source = solid(8, 8, [12, 34, 56, 255]);
    let blob = BlobArtifact::new(source.canonical_png().unwrap(), "image/png");

    let decoded = layerkit::ops::blob_to_image(&blob).unwrap();
    assert_eq!(decoded.content_hash().unwrap(), source.content_hash().unwrap());

    let framed = blob.encode();
    let blob_back = BlobArtifact::decode(&framed).unwrap();
    assert_eq!(blob_back.content_hash(), blob.content_hash());

    let out = composite(&[
        Layer::root(solid(16, 16, [255, 255, 255, 255])),
        Layer::anchored(decoded, absolute(4, 4)),
    ])
    .unwrap();
    assert_eq!(out.pixels().get_pixel(4, 4).0, [12, 34, 56, 255]);
    assert_eq!(out.pixels().get_pixel(3, 3).0, [255, 255, 255, 255]);
}
