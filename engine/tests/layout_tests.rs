//! Chunk Layout Tests - Coverage of the Grid Axis by Visible Regions

use scroll_unroll_engine::strip::{ChunkGeometry, ChunkLayout, ChunkRole, GridAxis};

const EPS: f32 = 1e-3;

fn chunk(id: &str, cell: usize, width: f32, l: f32, r: f32) -> ChunkGeometry {
    ChunkGeometry {
        id: id.into(),
        cell,
        width,
        height: 120.0,
        l,
        r,
    }
}

/// Spans sorted left to right.
fn sorted_spans(spans: &mut Vec<(f32, f32)>) {
    spans.sort_by(|a, b| a.0.total_cmp(&b.0));
}

// ============================================================================
// Coverage
// ============================================================================

#[test]
fn test_three_chunks_tile_without_gap_or_overlap() {
    let axis = GridAxis::build(&[50.0; 5]).unwrap();
    let layout = ChunkLayout::new(&axis, 1.0);
    let chunks = [
        chunk("a", 1, 100.0, 10.0, 10.0),
        chunk("b", 2, 100.0, 10.0, 10.0),
        chunk("c", 3, 100.0, 10.0, 10.0),
    ];
    let placements = layout.place_segment(&chunks).unwrap();
    assert_eq!(placements[0].role, ChunkRole::First);
    assert_eq!(placements[1].role, ChunkRole::Middle);
    assert_eq!(placements[2].role, ChunkRole::Last);

    let mut spans: Vec<_> = placements.iter().map(|p| p.visible_span()).collect();
    sorted_spans(&mut spans);
    for pair in spans.windows(2) {
        assert!((pair[1].0 - pair[0].1).abs() < EPS, "gap or overlap between {:?}", pair);
    }
    // middle chunk covers exactly its cell
    let (lo, hi) = axis.cell_span(2).unwrap();
    let middle = placements[1].visible_span();
    assert!((middle.0 - lo).abs() < EPS && (middle.1 - hi).abs() < EPS);
}

#[test]
fn test_run_of_middle_chunks_with_uneven_margins() {
    let axis = GridAxis::build(&[40.0, 55.0, 47.0, 62.0, 50.0, 45.0]).unwrap();
    let layout = ChunkLayout::new(&axis, 1.0);
    let margins = [(5.0, 20.0), (12.0, 3.0), (0.0, 0.0), (30.0, 30.0)];
    let mut spans = Vec::new();
    for (i, (l, r)) in margins.iter().enumerate() {
        let p = layout
            .place(&chunk(&format!("m{i}"), i + 1, 140.0, *l, *r), ChunkRole::Middle)
            .unwrap();
        let (lo, hi) = axis.cell_span(i + 1).unwrap();
        let (a, b) = p.visible_span();
        assert!((a - lo).abs() < EPS && (b - hi).abs() < EPS, "cell {} span {:?}", i + 1, (a, b));
        spans.push((a, b));
    }
    sorted_spans(&mut spans);
    for pair in spans.windows(2) {
        assert!((pair[1].0 - pair[0].1).abs() < EPS);
    }
}

#[test]
fn test_lone_chunk_anchors_like_first() {
    let axis = GridAxis::build(&[50.0; 3]).unwrap();
    let layout = ChunkLayout::new(&axis, 1.0);
    let placements = layout.place_segment(&[chunk("solo", 0, 80.0, 4.0, 6.0)]).unwrap();
    assert_eq!(placements[0].role, ChunkRole::Lone);
    let (lo, _) = axis.cell_span(0).unwrap();
    assert!((placements[0].visible_span().0 - lo).abs() < EPS);
    assert!((placements[0].scale_x - 80.0).abs() < EPS);
}

#[test]
fn test_segment_fails_fast_on_bad_chunk() {
    let axis = GridAxis::build(&[50.0; 4]).unwrap();
    let layout = ChunkLayout::new(&axis, 1.0);
    let chunks = [chunk("ok", 0, 100.0, 10.0, 10.0), chunk("bad", 1, 100.0, 50.0, 50.0)];
    let err = layout.place_segment(&chunks).unwrap_err();
    assert!(err.to_string().contains("bad"));
}
