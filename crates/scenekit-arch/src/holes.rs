//! Associating world-space hole annotations with wall base segments.

use glam::Vec2;
use indexmap::IndexMap;
use scenekit_scene::Box2;

use crate::schema::HoleKind;

/// Clip the parametric segment `p0 + t * (p1 - p0)` against a rectangle,
/// returning the `(t0, t1)` range inside it (Liang-Barsky).
pub fn clip_segment(p0: Vec2, p1: Vec2, rect: &Box2) -> Option<(f32, f32)> {
    let d = p1 - p0;
    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;
    let checks = [
        (-d.x, p0.x - rect.min.x),
        (d.x, rect.max.x - p0.x),
        (-d.y, p0.y - rect.min.y),
        (d.y, rect.max.y - p0.y),
    ];
    for (p, q) in checks {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            if r > t0 {
                t0 = r;
            }
        } else {
            if r < t0 {
                return None;
            }
            if r < t1 {
                t1 = r;
            }
        }
    }
    Some((t0, t1))
}

/// A wall base segment in planar coordinates, accumulating associated
/// holes in wall-local coordinates.
#[derive(Debug, Clone)]
pub struct WallInfo {
    pub id: String,
    pub start: Vec2,
    pub end: Vec2,
    /// Wall height above its base.
    pub height: f32,
    /// Holes in wall-local coordinates (x along the base, y up).
    pub holes: Vec<WallHole>,
}

impl WallInfo {
    pub fn new(id: impl Into<String>, start: Vec2, end: Vec2, height: f32) -> Self {
        Self {
            id: id.into(),
            start,
            end,
            height,
            holes: Vec::new(),
        }
    }

    pub fn width(&self) -> f32 {
        (self.end - self.start).length()
    }
}

/// A hole attached to a wall.
#[derive(Debug, Clone, PartialEq)]
pub struct WallHole {
    pub id: String,
    pub kind: Option<HoleKind>,
    pub bbox: Box2,
}

/// A world-space hole annotation awaiting wall association.
#[derive(Debug, Clone)]
pub struct HoleCandidate {
    pub id: String,
    pub kind: Option<HoleKind>,
    /// Planar footprint of the opening.
    pub footprint: Box2,
    /// Vertical extent `(min, max)` above the wall base plane.
    pub vertical: (f32, f32),
}

/// Attach each hole candidate to every wall whose base segment passes
/// through its footprint. A hole may land on several walls; within a wall
/// the first computed box wins.
///
/// Axis-aligned walls (either planar delta below `threshold`) take the
/// clip ratios directly; oblique walls project the footprint corners onto
/// the base line for a tighter range. Hole boxes are clamped into
/// `[0, width] × [0, height]` and degenerate results dropped.
pub fn associate_walls_with_holes(
    walls: &mut [WallInfo],
    holes: &[HoleCandidate],
    threshold: f32,
) -> IndexMap<String, Vec<String>> {
    let mut hole_to_walls: IndexMap<String, Vec<String>> = IndexMap::new();
    for hole in holes {
        hole_to_walls.entry(hole.id.clone()).or_default();
    }

    for wall in walls.iter_mut() {
        let width = wall.width();
        if width <= f32::EPSILON {
            log::warn!("wall {} has a degenerate base segment; skipping holes", wall.id);
            continue;
        }
        if wall.height <= 0.0 {
            log::error!(
                "wall {} has non-positive height {}; holes skipped",
                wall.id,
                wall.height
            );
            continue;
        }
        let dir = wall.end - wall.start;

        for hole in holes {
            let Some((t0, t1)) = clip_segment(wall.start, wall.end, &hole.footprint) else {
                continue;
            };
            let axis_aligned = dir.x.abs() < threshold || dir.y.abs() < threshold;
            let (r0, r1) = if axis_aligned {
                (t0, t1)
            } else {
                // Project the footprint corners onto the base line.
                let inv_len_sq = 1.0 / dir.length_squared();
                let mut lo = f32::INFINITY;
                let mut hi = f32::NEG_INFINITY;
                let fp = &hole.footprint;
                for corner in [
                    fp.min,
                    Vec2::new(fp.max.x, fp.min.y),
                    fp.max,
                    Vec2::new(fp.min.x, fp.max.y),
                ] {
                    let t = (corner - wall.start).dot(dir) * inv_len_sq;
                    lo = lo.min(t);
                    hi = hi.max(t);
                }
                (lo.clamp(0.0, 1.0), hi.clamp(0.0, 1.0))
            };

            let bbox = Box2::new(
                Vec2::new(
                    (r0 * width).clamp(0.0, width),
                    hole.vertical.0.clamp(0.0, wall.height),
                ),
                Vec2::new(
                    (r1 * width).clamp(0.0, width),
                    hole.vertical.1.clamp(0.0, wall.height),
                ),
            );
            if bbox.is_degenerate() {
                log::warn!(
                    "hole {} degenerates on wall {} after clamping; dropped",
                    hole.id,
                    wall.id
                );
                continue;
            }
            if wall.holes.iter().any(|h| h.id == hole.id) {
                continue;
            }
            wall.holes.push(WallHole {
                id: hole.id.clone(),
                kind: hole.kind,
                bbox,
            });
            hole_to_walls
                .entry(hole.id.clone())
                .or_default()
                .push(wall.id.clone());
        }
    }

    hole_to_walls.retain(|_, walls| !walls.is_empty());
    hole_to_walls
}

/// Merge overlapping hole boxes pairwise: one pass over ordered pairs,
/// folding the later box into the earlier one. Chains that only become
/// connected through a merged box are left split.
pub fn merge_hole_boxes(holes: Vec<WallHole>) -> Vec<WallHole> {
    let originals: Vec<Box2> = holes.iter().map(|h| h.bbox).collect();
    let mut removed = vec![false; holes.len()];
    let mut out = holes;
    for i in 0..out.len() {
        if removed[i] {
            continue;
        }
        for j in (i + 1)..out.len() {
            if removed[j] {
                continue;
            }
            // Overlap is tested against the original boxes, so a chain that
            // only connects through an already-merged box stays split.
            if originals[i].intersects(&originals[j]) {
                log::debug!("merging overlapping holes {} and {}", out[i].id, out[j].id);
                out[i].bbox = out[i].bbox.union(&originals[j]);
                removed[j] = true;
            }
        }
    }
    out.into_iter()
        .zip(removed)
        .filter_map(|(h, r)| (!r).then_some(h))
        .collect()
}
