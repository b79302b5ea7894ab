//! Normalized preview projection of a boundary path.
//!
//! Paths are mapped into a fixed 100×100 box: longitude to `x`, latitude
//! to `y` with the axis inverted so north is up on screen. The projection
//! is recomputed from scratch on every call; walking surveys produce at
//! most a few hundred points.

use geo::{BoundingRect, LineString, Rect};
use place_mapper_place_models::BoundaryPath;

/// Side length of the preview box.
pub const PREVIEW_SIZE: f64 = 100.0;

/// Span substituted for an axis on which every point has the same value.
pub const DEGENERATE_SPAN: f64 = 0.0001;

/// A point in preview space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    /// Horizontal position, `0` at the westernmost sample.
    pub x: f64,
    /// Vertical position, `0` at the northernmost sample.
    pub y: f64,
}

/// A projected sample marker; the most recent sample is highlighted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewMarker {
    /// Marker position.
    pub point: ProjectedPoint,
    /// Whether this is the last recorded sample.
    pub is_latest: bool,
}

/// Bounding box of the path in `(lng, lat)` space.
#[must_use]
pub fn bounds(path: &BoundaryPath) -> Option<Rect<f64>> {
    let line: LineString<f64> = path.points().iter().map(|p| (p.lng, p.lat)).collect();
    line.bounding_rect()
}

/// Projects every sample of `path` into the preview box.
///
/// Returns an empty list for an empty path.
#[must_use]
pub fn project(path: &BoundaryPath) -> Vec<ProjectedPoint> {
    let Some(rect) = bounds(path) else {
        return Vec::new();
    };

    let min = rect.min();
    let lng_span = non_degenerate(rect.width());
    let lat_span = non_degenerate(rect.height());

    path.points()
        .iter()
        .map(|p| ProjectedPoint {
            x: (p.lng - min.x) / lng_span * PREVIEW_SIZE,
            y: PREVIEW_SIZE - (p.lat - min.y) / lat_span * PREVIEW_SIZE,
        })
        .collect()
}

const fn non_degenerate(span: f64) -> f64 {
    if span > 0.0 { span } else { DEGENERATE_SPAN }
}

/// SVG path data for the preview outline, closed back to the start.
///
/// Empty when the path has fewer than two points.
#[must_use]
pub fn svg_path(path: &BoundaryPath) -> String {
    if !path.is_renderable() {
        return String::new();
    }

    let segments: Vec<String> = project(path)
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let command = if i == 0 { 'M' } else { 'L' };
            format!("{command} {} {}", p.x, p.y)
        })
        .collect();

    format!("{} Z", segments.join(" "))
}

/// Projected markers for each sample.
#[must_use]
pub fn preview_markers(path: &BoundaryPath) -> Vec<PreviewMarker> {
    let points = project(path);
    let last = points.len().saturating_sub(1);

    points
        .into_iter()
        .enumerate()
        .map(|(i, point)| PreviewMarker {
            point,
            is_latest: i == last,
        })
        .collect()
}

/// Whether the preview polygon should be drawn (more than two points).
#[must_use]
pub fn is_previewable(path: &BoundaryPath) -> bool {
    path.is_area()
}
