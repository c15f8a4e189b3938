//! End-to-end tests for reticle assembly.
//!
//! These exercise the public API the way the CLI does: load geometry, pack,
//! assemble, export.

use std::collections::BTreeSet;

use pretty_assertions::assert_eq;

use reticle::{
    ReticleAssembler, ReticleError, ReticleProfile,
    barcode::{self, BarMetrics, SymbologyTable},
    export::{ExportFormat, Manifest, PreviewOptions, render_png, render_svg},
    geometry::{Canvas, Label, Layer, Point, Rect, Rotation, Shape, Size},
    pack, populate,
};

const IMAGE: Size = Size::new(5000.0, 5000.0);

/// One square image per layer, each with a small marker so images are distinct.
fn source(count: u16) -> (Canvas, Vec<Layer>) {
    let mut canvas = Canvas::new("source");
    let layers: Vec<Layer> = (1..=count).map(|l| Layer::new(l, 0)).collect();
    for (i, &layer) in layers.iter().enumerate() {
        canvas.add_rect(Rect::centered(Point::ORIGIN, IMAGE), layer);
        canvas.add_rect(
            Rect::new(Point::new(-2500.0, -2500.0), Size::new(100.0 * (i + 1) as f64, 100.0)),
            layer,
        );
    }
    (canvas, layers)
}

fn table() -> &'static SymbologyTable {
    SymbologyTable::builtin().unwrap()
}

fn assemble(count: u16, id: &str, text: &str) -> Vec<Canvas> {
    let (src, layers) = source(count);
    let profile = ReticleProfile::ASML300;
    ReticleAssembler::new(&profile, table())
        .assemble(&src, IMAGE, &layers, id, text)
        .unwrap()
}

// ============================================================================
// Assembly
// ============================================================================

#[test]
fn test_twenty_five_images_make_three_reticles() {
    let reticles = assemble(25, "abc", "hello");
    let names: Vec<&str> = reticles.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["ABC-R0", "ABC-R1", "ABC-R2"]);
    assert!(reticles.iter().all(Canvas::is_flat));

    // 2 rects per image; last reticle holds 7 images
    let image_rects = |r: &Canvas| {
        r.elements
            .iter()
            .filter(|e| matches!(e.shape, Shape::Rect(_)) && e.layer == Layer::new(4, 0))
            .count()
    };
    let barcode_rects = |name: &str| {
        barcode::encode(name, barcode::DEFAULT_MAX_LENGTH, table())
            .iter()
            .map(|s| s.bar_count())
            .sum::<usize>()
    };
    assert_eq!(image_rects(&reticles[0]), 9 * 2 + barcode_rects("ABC-R0"));
    assert_eq!(image_rects(&reticles[2]), 7 * 2 + barcode_rects("ABC-R2"));
}

#[test]
fn test_assembly_is_deterministic() {
    let first = assemble(12, "lot", "x");
    let second = assemble(12, "lot", "x");
    assert_eq!(first, second);
}

#[test]
fn test_images_land_on_slot_centers() {
    let (src, layers) = source(25);
    let packing = pack(Size::new(88000.0, 88000.0), 4.0, 4000.0, 25, IMAGE).unwrap();
    let canvases = populate(&src, &layers, &packing, 4.0, Layer::new(4, 0)).unwrap();

    for (canvas, assignment) in canvases.iter().zip(&packing.canvases) {
        let centers: BTreeSet<(i64, i64)> = canvas
            .elements
            .iter()
            .filter_map(|e| e.as_rect())
            .filter(|r| r.size == Size::new(20000.0, 20000.0))
            .map(|r| (r.center().x as i64, r.center().y as i64))
            .collect();
        let expected: BTreeSet<(i64, i64)> = assignment
            .slots
            .iter()
            .map(|s| (s.offset.x as i64, s.offset.y as i64))
            .collect();
        assert_eq!(centers, expected);
    }
}

#[test]
fn test_source_canvas_untouched() {
    let (src, layers) = source(4);
    let before = src.clone();
    let profile = ReticleProfile::ASML300;
    ReticleAssembler::new(&profile, table())
        .assemble(&src, IMAGE, &layers, "id", "")
        .unwrap();
    assert_eq!(src, before);
}

#[test]
fn test_label_placement_and_normalization() {
    let reticles = assemble(1, "identifier-long", "annotation text here");
    let labels: Vec<&Label> = reticles[0].elements.iter().filter_map(|e| e.as_label()).collect();

    let profile = ReticleProfile::ASML300;
    assert_eq!(labels.len(), 2);
    assert_eq!(labels[0].text, "IDENTIFI-R0");
    assert_eq!(labels[0].anchor, profile.id_anchor);
    assert_eq!(labels[0].height, profile.text_height);
    assert_eq!(labels[0].rotation, Rotation::R90);
    assert_eq!(labels[1].text, "ANNOTATION T");
    assert_eq!(labels[1].anchor, profile.text_anchor);
    assert_eq!(reticles[0].name, "IDENTIFI-R0");
}

#[test]
fn test_barcode_encodes_reticle_name() {
    let reticles = assemble(1, "q1", "");
    let profile = ReticleProfile::ASML300;

    // bars are the 5000-tall, narrow-or-wide rectangles after rotation
    let bars: Vec<&Rect> = reticles[0]
        .elements
        .iter()
        .filter_map(|e| e.as_rect())
        .filter(|r| r.size.width == profile.barcode.height)
        .collect();
    let symbols = barcode::encode("Q1-R0", 12, table());
    assert_eq!(bars.len(), symbols.iter().map(|s| s.bar_count()).sum::<usize>());

    // rotated downwards: every bar lies below the anchor, within the code width
    let width = BarMetrics::ASML300.total_width(5);
    let anchor = profile.barcode.anchor;
    for bar in bars {
        assert!(bar.far_corner().y <= anchor.y - BarMetrics::ASML300.leading_quiet_zone);
        assert!(bar.origin.y >= anchor.y - width);
        assert_eq!(bar.center().x, anchor.x);
    }
}

#[test]
fn test_template_round_trips_through_json() {
    let mut frame = Canvas::new("frame");
    frame.add_rect(
        Rect::centered(Point::ORIGIN, Size::new(152000.0, 152000.0)),
        Layer::new(63, 0),
    );
    frame.add_label(Label::new("FIDUCIAL", Point::new(70000.0, -70000.0), 1000.0), Layer::new(63, 0));

    let dir = std::env::temp_dir().join(format!("reticle-template-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("frame.json");
    frame.save(&path).unwrap();
    let loaded = Canvas::load(&path).unwrap();
    assert_eq!(loaded, frame);

    let (src, layers) = source(10);
    let profile = ReticleProfile::ASML300;
    let reticles = ReticleAssembler::new(&profile, table())
        .with_template(&loaded)
        .assemble(&src, IMAGE, &layers, "t", "")
        .unwrap();
    for reticle in &reticles {
        assert_eq!(&reticle.elements[..2], &frame.elements[..]);
    }

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_finished_reticle_round_trips_through_json() {
    let reticle = assemble(3, "rt", "json").remove(0);
    let json = reticle.to_json().unwrap();
    assert_eq!(Canvas::from_json(&json).unwrap(), reticle);
}

// ============================================================================
// Barcode
// ============================================================================

#[test]
fn test_barcode_width_for_every_character() {
    let metrics = BarMetrics::ASML300;
    for ch in table().characters() {
        let text = ch.to_string();
        let symbols = barcode::encode(&text, 12, table());
        let layout = barcode::render(&symbols, 5000.0, Layer::new(4, 0));
        assert_eq!(layout.width, metrics.total_width(1), "character {:?}", ch);
        assert_eq!(layout.bars.len(), 15);
    }
}

#[test]
fn test_barcode_case_insensitive() {
    let upper = barcode::barcode("LOT-7", 5000.0, Layer::new(4, 0)).unwrap();
    let lower = barcode::barcode("lot-7", 5000.0, Layer::new(4, 0)).unwrap();
    assert_eq!(upper.elements, lower.elements);
}

#[test]
fn test_custom_symbology_table() {
    let json = r#"{
        "start": ["nb","ws","nb","ns","wb","ns","wb","ns","nb"],
        "x":     ["wb","ns","nb","ws","nb","ns","nb","ns","wb"]
    }"#;
    let custom = SymbologyTable::from_json(json).unwrap();
    assert_eq!(custom.len(), 1);
    assert_eq!(barcode::filter_text("XYX", 12, &custom), "xx");

    let bad = r#"{"start": ["nb","nb","nb","nb","nb","nb","nb","nb","nb"]}"#;
    assert!(SymbologyTable::from_json(bad).is_err());
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_oversized_image_is_rejected() {
    let (src, layers) = source(1);
    let profile = ReticleProfile::ASML300;
    let err = ReticleAssembler::new(&profile, table())
        .assemble(&src, Size::new(23000.0, 1000.0), &layers, "x", "")
        .unwrap_err();
    assert!(matches!(err, ReticleError::SlotExceedsCanvas { .. }));
}

#[test]
fn test_invalid_profile_is_rejected() {
    let profile = ReticleProfile::from_json(r#"{"clearance": -1}"#).unwrap();
    let (src, layers) = source(1);
    let err = ReticleAssembler::new(&profile, table())
        .assemble(&src, IMAGE, &layers, "x", "")
        .unwrap_err();
    assert!(matches!(err, ReticleError::InvalidConfig(_)));
}

#[test]
fn test_missing_geometry_file() {
    let err = Canvas::load(std::path::Path::new("/nonexistent/source.json")).unwrap_err();
    assert!(matches!(err, ReticleError::Io(_)));
}

// ============================================================================
// Export
// ============================================================================

#[test]
fn test_svg_export_has_reticle_layers() {
    let mut frame = Canvas::new("frame");
    frame.add_rect(Rect::centered(Point::ORIGIN, Size::new(1000.0, 1000.0)), Layer::new(63, 0));
    let (src, layers) = source(2);
    let profile = ReticleProfile::ASML300;
    let reticle = ReticleAssembler::new(&profile, table())
        .with_template(&frame)
        .assemble(&src, IMAGE, &layers, "svg", "text")
        .unwrap()
        .remove(0);

    let svg = render_svg(&reticle);
    assert_eq!(svg.matches("<g ").count(), 2);
    assert!(svg.contains("SVG-R0"));
    assert_eq!(svg.matches("<text").count(), 2);
}

#[test]
fn test_png_export_smoke() {
    let reticle = assemble(2, "png", "").remove(0);
    let options = PreviewOptions {
        max_dimension: 256,
        margin: 4,
    };
    let bytes = render_png(&reticle, &options).unwrap();
    assert_eq!(&bytes[..4], b"\x89PNG");

    let via_format = ExportFormat::Json.render(&reticle).unwrap();
    assert!(via_format.starts_with(b"{"));
}

fn scratch_dir(tag: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("reticle-{}-{}", tag, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn test_manifest_lists_reticles_slots_and_files() {
    let (src, layers) = source(25);
    let profile = ReticleProfile::ASML300;
    let assembly = ReticleAssembler::new(&profile, table())
        .build(&src, IMAGE, &layers, "abc", "")
        .unwrap();

    let dir = scratch_dir("manifest");
    let mut manifest = Manifest::from_assembly(&assembly, &profile.name).with_source("images.json");
    let path = manifest
        .write_assembly(&assembly, &[ExportFormat::Json, ExportFormat::Svg], &dir)
        .unwrap();
    assert_eq!(path, dir.join("manifest.json"));

    let saved = Manifest::load(&path).unwrap();
    assert_eq!(saved, manifest);
    assert_eq!(saved.profile, "ASML300");
    assert_eq!(saved.image_count, 25);
    assert_eq!((saved.grid.columns, saved.grid.rows, saved.grid.capacity), (3, 3, 9));
    assert!(chrono::DateTime::parse_from_rfc3339(&saved.generated_at).is_ok());

    let names: Vec<&str> = saved.reticles.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["ABC-R0", "ABC-R1", "ABC-R2"]);
    let counts: Vec<usize> = saved.reticles.iter().map(|r| r.slot_count).collect();
    assert_eq!(counts, vec![9, 9, 7]);
    assert_eq!(saved.reticles[0].slots, (0..9).collect::<Vec<_>>());
    assert_eq!(saved.reticles[2].slots, (18..25).collect::<Vec<_>>());

    for entry in &saved.reticles {
        assert_eq!(
            entry.files,
            vec![
                dir.join(format!("{}.json", entry.name)),
                dir.join(format!("{}.svg", entry.name)),
            ]
        );
        assert!(entry.files.iter().all(|f| f.is_file()));
    }
    assert_eq!(Canvas::load(&saved.reticles[1].files[0]).unwrap(), assembly.reticles[1]);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_ids_with_slash_export_inside_out_dir() {
    let (src, layers) = source(1);
    let profile = ReticleProfile::ASML300;
    let assembly = ReticleAssembler::new(&profile, table())
        .build(&src, IMAGE, &layers, "lot/7", "")
        .unwrap();
    assert_eq!(assembly.reticles[0].name, "LOT/7-R0");

    let dir = scratch_dir("slash");
    let mut manifest = Manifest::from_assembly(&assembly, &profile.name);
    manifest
        .write_assembly(&assembly, &[ExportFormat::Json], &dir)
        .unwrap();

    let file = &manifest.reticles[0].files[0];
    assert_eq!(file, &dir.join("LOT_7-R0.json"));
    assert_eq!(Canvas::load(file).unwrap().name, "LOT/7-R0");

    std::fs::remove_dir_all(&dir).unwrap();
}
