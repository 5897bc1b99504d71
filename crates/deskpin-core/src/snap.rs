//! Snap functionality for aligning widget edges to monitor and peer edges.
//!
//! A [`SnapContext`] is rebuilt for every drag or resize frame. It holds the
//! candidate lines on each axis; resolving an axis is a linear scan, which is
//! fine for the tens of widgets a desktop carries.

use crate::layout::WidgetId;
use crate::windowing::Monitor;
use kurbo::Rect;
use std::cmp::Ordering;

/// Screen axis a snap line constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Vertical lines (constant x).
    X,
    /// Horizontal lines (constant y).
    Y,
}

/// Where a snap line came from.
///
/// The derived ordering is the tie-break order: monitors before widgets,
/// lower monitor index first, then lower widget id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SnapSource {
    /// An edge of the monitor at this enumeration index.
    Monitor(usize),
    /// An edge of another visible widget.
    Widget(WidgetId),
}

/// A coordinate an edge can align to.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapLine {
    /// Axis the line constrains.
    pub axis: Axis,
    /// Coordinate of the line on its axis.
    pub value: f64,
    /// Extent covered on the perpendicular axis (min, max).
    pub span: (f64, f64),
    /// Origin of the line.
    pub source: SnapSource,
}

impl SnapLine {
    /// Whether a perpendicular extent touches or overlaps this line's span.
    fn overlaps(&self, extent: (f64, f64)) -> bool {
        extent.0 <= self.span.1 && extent.1 >= self.span.0
    }
}

/// The winning line for one axis and the shift needed to reach it.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisSnap {
    /// Amount to add to the moving edge(s) on this axis.
    pub offset: f64,
    /// The line that won.
    pub line: SnapLine,
}

/// Result of snapping a rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapResult {
    /// The adjusted rectangle.
    pub rect: Rect,
    /// The line the x axis snapped to, if any.
    pub snapped_x: Option<SnapLine>,
    /// The line the y axis snapped to, if any.
    pub snapped_y: Option<SnapLine>,
}

impl SnapResult {
    /// Create a result with no snapping.
    pub fn none(rect: Rect) -> Self {
        Self {
            rect,
            snapped_x: None,
            snapped_y: None,
        }
    }

    /// Check if any snapping occurred.
    pub fn is_snapped(&self) -> bool {
        self.snapped_x.is_some() || self.snapped_y.is_some()
    }
}

/// Candidate snap lines for one drag or resize frame.
#[derive(Debug, Clone, Default)]
pub struct SnapContext {
    threshold: f64,
    x_lines: Vec<SnapLine>,
    y_lines: Vec<SnapLine>,
}

impl SnapContext {
    /// Create an empty context with the given threshold.
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            x_lines: Vec::new(),
            y_lines: Vec::new(),
        }
    }

    /// Build a context from monitor bounds and the rectangles of peer widgets.
    pub fn build<'a>(
        threshold: f64,
        monitors: &[Monitor],
        peers: impl IntoIterator<Item = (&'a WidgetId, Rect)>,
    ) -> Self {
        let mut context = Self::new(threshold);
        for (index, monitor) in monitors.iter().enumerate() {
            context.add_rect_edges(monitor.bounds, SnapSource::Monitor(index));
        }
        for (id, rect) in peers {
            context.add_rect_edges(rect, SnapSource::Widget(id.clone()));
        }
        context
    }

    /// Add the four edges of a rectangle as snap lines.
    pub fn add_rect_edges(&mut self, rect: Rect, source: SnapSource) {
        for value in [rect.x0, rect.x1] {
            self.x_lines.push(SnapLine {
                axis: Axis::X,
                value,
                span: (rect.y0, rect.y1),
                source: source.clone(),
            });
        }
        for value in [rect.y0, rect.y1] {
            self.y_lines.push(SnapLine {
                axis: Axis::Y,
                value,
                span: (rect.x0, rect.x1),
                source: source.clone(),
            });
        }
    }

    /// Snap threshold in pixels.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// All candidate lines on an axis.
    pub fn lines(&self, axis: Axis) -> &[SnapLine] {
        match axis {
            Axis::X => &self.x_lines,
            Axis::Y => &self.y_lines,
        }
    }

    /// Find the nearest line on `axis` for any of `edges`.
    ///
    /// `extent` is the moving rectangle's range on the perpendicular axis; lines
    /// whose span does not overlap it are ignored. `accept` can veto a shift
    /// (used by resize to keep the size above its floor).
    pub fn snap_axis(
        &self,
        axis: Axis,
        edges: &[f64],
        extent: (f64, f64),
        accept: impl Fn(f64) -> bool,
    ) -> Option<AxisSnap> {
        let mut best: Option<(f64, AxisSnap)> = None;

        for line in self.lines(axis) {
            if !line.overlaps(extent) {
                continue;
            }
            for &edge in edges {
                let offset = line.value - edge;
                let distance = offset.abs();
                if distance >= self.threshold || !accept(offset) {
                    continue;
                }
                let better = match &best {
                    None => true,
                    Some((best_distance, current)) => {
                        compare_candidates(distance, line, *best_distance, &current.line)
                            == Ordering::Less
                    }
                };
                if better {
                    best = Some((
                        distance,
                        AxisSnap {
                            offset,
                            line: line.clone(),
                        },
                    ));
                }
            }
        }

        best.map(|(_, snap)| snap)
    }

    /// Snap a rectangle being dragged: both edges on each axis are candidates
    /// and the whole rectangle shifts.
    pub fn snap_position(&self, rect: Rect) -> SnapResult {
        let snapped_x = self.snap_axis(Axis::X, &[rect.x0, rect.x1], (rect.y0, rect.y1), |_| true);
        let snapped_y = self.snap_axis(Axis::Y, &[rect.y0, rect.y1], (rect.x0, rect.x1), |_| true);

        let dx = snapped_x.as_ref().map_or(0.0, |s| s.offset);
        let dy = snapped_y.as_ref().map_or(0.0, |s| s.offset);

        SnapResult {
            rect: rect + kurbo::Vec2::new(dx, dy),
            snapped_x: snapped_x.map(|s| s.line),
            snapped_y: snapped_y.map(|s| s.line),
        }
    }

    /// Snap the bottom-right corner of a rectangle being resized from a fixed
    /// top-left anchor. Shifts that would shrink below `min_width`/`min_height`
    /// are rejected.
    pub fn snap_corner(&self, rect: Rect, min_width: f64, min_height: f64) -> SnapResult {
        let width = rect.width();
        let height = rect.height();
        let snapped_x = self.snap_axis(Axis::X, &[rect.x1], (rect.y0, rect.y1), |offset| {
            width + offset >= min_width
        });
        let snapped_y = self.snap_axis(Axis::Y, &[rect.y1], (rect.x0, rect.x1), |offset| {
            height + offset >= min_height
        });

        let mut snapped = rect;
        if let Some(snap) = &snapped_x {
            snapped.x1 += snap.offset;
        }
        if let Some(snap) = &snapped_y {
            snapped.y1 += snap.offset;
        }

        SnapResult {
            rect: snapped,
            snapped_x: snapped_x.map(|s| s.line),
            snapped_y: snapped_y.map(|s| s.line),
        }
    }
}

/// Order two candidates: nearest first, then by source, then lower coordinate.
fn compare_candidates(distance: f64, line: &SnapLine, other_distance: f64, other: &SnapLine) -> Ordering {
    distance
        .total_cmp(&other_distance)
        .then_with(|| line.source.cmp(&other.source))
        .then_with(|| line.value.total_cmp(&other.value))
}
