//! Polygon triangulation and panel meshing.

use glam::{Vec2, Vec3};
use scenekit_scene::{Box2, TriangleMesh};

const EPS: f32 = 1e-5;

/// Signed area of a polygon; positive means counter-clockwise.
pub fn signed_area(points: &[Vec2]) -> f32 {
    let mut area = 0.0;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        area += a.x * b.y - b.x * a.y;
    }
    area * 0.5
}

fn point_in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let d1 = (b - a).perp_dot(p - a);
    let d2 = (c - b).perp_dot(p - b);
    let d3 = (a - c).perp_dot(p - c);
    let has_neg = d1 < -EPS || d2 < -EPS || d3 < -EPS;
    let has_pos = d1 > EPS || d2 > EPS || d3 > EPS;
    !(has_neg && has_pos)
}

/// Ear-clipping triangulation of a simple polygon. Input may wind either
/// way; output triangles are counter-clockwise.
pub fn triangulate_polygon(points: &[Vec2]) -> Vec<[usize; 3]> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }
    let mut indices: Vec<usize> = (0..n).collect();
    if signed_area(points) < 0.0 {
        indices.reverse();
    }
    let mut tris = Vec::with_capacity(n - 2);
    while indices.len() > 3 {
        let m = indices.len();
        let mut clipped = false;
        for i in 0..m {
            let ia = indices[(i + m - 1) % m];
            let ib = indices[i];
            let ic = indices[(i + 1) % m];
            let (a, b, c) = (points[ia], points[ib], points[ic]);
            // Reflex corners cannot be ears.
            if (b - a).perp_dot(c - b) <= EPS {
                continue;
            }
            let blocked = indices.iter().any(|&j| {
                j != ia && j != ib && j != ic && point_in_triangle(points[j], a, b, c)
            });
            if blocked {
                continue;
            }
            tris.push([ia, ib, ic]);
            indices.remove(i);
            clipped = true;
            break;
        }
        if !clipped {
            log::warn!("ear clipping stalled on a degenerate polygon; fanning the remainder");
            for i in 1..indices.len() - 1 {
                tris.push([indices[0], indices[i], indices[i + 1]]);
            }
            return tris;
        }
    }
    tris.push([indices[0], indices[1], indices[2]]);
    tris
}

/// Orthonormal in-plane basis for a face normal.
fn plane_basis(normal: Vec3) -> (Vec3, Vec3) {
    let axis = if normal.x.abs() < 0.9 { Vec3::X } else { Vec3::Y };
    let u = axis.cross(normal).normalize();
    let v = normal.cross(u);
    (u, v)
}

/// Mesh a planar polygon, optionally extruded along its normal by `depth`.
/// Faces are flat-shaded with duplicated vertices.
pub fn extrude_polygon(points: &[Vec3], normal: Vec3, depth: f32) -> TriangleMesh {
    let mut mesh = TriangleMesh::new();
    if points.len() < 3 {
        return mesh;
    }
    let (u, v) = plane_basis(normal);
    let mut flat: Vec<Vec3> = points.to_vec();
    let mut pts2: Vec<Vec2> = flat.iter().map(|p| Vec2::new(p.dot(u), p.dot(v))).collect();
    // Counter-clockwise in the (u, v) basis means the face normal comes out
    // along `normal`.
    if signed_area(&pts2) < 0.0 {
        flat.reverse();
        pts2.reverse();
    }
    let tris = triangulate_polygon(&pts2);

    if depth.abs() <= EPS {
        let base: Vec<u32> = flat.iter().map(|&p| mesh.push_vertex(p, normal)).collect();
        for [a, b, c] in &tris {
            mesh.push_triangle(base[*a], base[*b], base[*c]);
        }
        return mesh;
    }

    let offset = normal * depth;
    let top: Vec<u32> = flat
        .iter()
        .map(|&p| mesh.push_vertex(p + offset, normal))
        .collect();
    for [a, b, c] in &tris {
        mesh.push_triangle(top[*a], top[*b], top[*c]);
    }
    let bottom: Vec<u32> = flat.iter().map(|&p| mesh.push_vertex(p, -normal)).collect();
    for [a, b, c] in &tris {
        mesh.push_triangle(bottom[*a], bottom[*c], bottom[*b]);
    }
    for i in 0..flat.len() {
        let p0 = flat[i];
        let p1 = flat[(i + 1) % flat.len()];
        let side = (p1 - p0).cross(normal).normalize_or_zero();
        let a = mesh.push_vertex(p0, side);
        let b = mesh.push_vertex(p1, side);
        let c = mesh.push_vertex(p1 + offset, side);
        let d = mesh.push_vertex(p0 + offset, side);
        mesh.push_triangle(a, b, c);
        mesh.push_triangle(a, c, d);
    }
    mesh
}

/// Append an axis-aligned box as six flat-shaded quads.
pub fn push_box(mesh: &mut TriangleMesh, min: Vec3, max: Vec3) {
    let quads: [(Vec3, [Vec3; 4]); 6] = [
        (
            Vec3::Z,
            [
                Vec3::new(min.x, min.y, max.z),
                Vec3::new(max.x, min.y, max.z),
                Vec3::new(max.x, max.y, max.z),
                Vec3::new(min.x, max.y, max.z),
            ],
        ),
        (
            -Vec3::Z,
            [
                Vec3::new(max.x, min.y, min.z),
                Vec3::new(min.x, min.y, min.z),
                Vec3::new(min.x, max.y, min.z),
                Vec3::new(max.x, max.y, min.z),
            ],
        ),
        (
            Vec3::X,
            [
                Vec3::new(max.x, min.y, max.z),
                Vec3::new(max.x, min.y, min.z),
                Vec3::new(max.x, max.y, min.z),
                Vec3::new(max.x, max.y, max.z),
            ],
        ),
        (
            -Vec3::X,
            [
                Vec3::new(min.x, min.y, min.z),
                Vec3::new(min.x, min.y, max.z),
                Vec3::new(min.x, max.y, max.z),
                Vec3::new(min.x, max.y, min.z),
            ],
        ),
        (
            Vec3::Y,
            [
                Vec3::new(min.x, max.y, max.z),
                Vec3::new(max.x, max.y, max.z),
                Vec3::new(max.x, max.y, min.z),
                Vec3::new(min.x, max.y, min.z),
            ],
        ),
        (
            -Vec3::Y,
            [
                Vec3::new(min.x, min.y, min.z),
                Vec3::new(max.x, min.y, min.z),
                Vec3::new(max.x, min.y, max.z),
                Vec3::new(min.x, min.y, max.z),
            ],
        ),
    ];
    for (normal, corners) in quads {
        let a = mesh.push_vertex(corners[0], normal);
        let b = mesh.push_vertex(corners[1], normal);
        let c = mesh.push_vertex(corners[2], normal);
        let d = mesh.push_vertex(corners[3], normal);
        mesh.push_triangle(a, b, c);
        mesh.push_triangle(a, c, d);
    }
}

/// Mesh a wall panel in wall-local coordinates: x along the base from 0 to
/// `width`, y up from 0 to `height`, z across the thickness centered on 0.
///
/// Hole boxes are subtracted by cutting the face into vertical strips at
/// every hole edge and emitting the solid rectangles of each strip as
/// boxes, so hole reveal faces come out of the box sides.
pub fn wall_panel(width: f32, height: f32, depth: f32, holes: &[Box2]) -> TriangleMesh {
    let mut mesh = TriangleMesh::new();
    if width <= EPS || height <= EPS {
        return mesh;
    }
    let mut xs = vec![0.0, width];
    for h in holes {
        xs.push(h.min.x.clamp(0.0, width));
        xs.push(h.max.x.clamp(0.0, width));
    }
    xs.sort_by(|a, b| a.total_cmp(b));
    xs.dedup_by(|a, b| (*a - *b).abs() <= EPS);

    let half = depth * 0.5;
    for pair in xs.windows(2) {
        let (x0, x1) = (pair[0], pair[1]);
        if x1 - x0 <= EPS {
            continue;
        }
        let mid = 0.5 * (x0 + x1);
        let mut cuts: Vec<(f32, f32)> = holes
            .iter()
            .filter(|h| h.min.x < mid && mid < h.max.x)
            .map(|h| (h.min.y.max(0.0), h.max.y.min(height)))
            .filter(|(y0, y1)| y1 - y0 > EPS)
            .collect();
        cuts.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut y = 0.0;
        for (cy0, cy1) in cuts {
            if cy0 - y > EPS {
                push_box(
                    &mut mesh,
                    Vec3::new(x0, y, -half),
                    Vec3::new(x1, cy0, half),
                );
            }
            y = y.max(cy1);
        }
        if height - y > EPS {
            push_box(
                &mut mesh,
                Vec3::new(x0, y, -half),
                Vec3::new(x1, height, half),
            );
        }
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(0.0, 2.0),
        ]
    }

    fn triangle_area(points: &[Vec2], tri: &[usize; 3]) -> f32 {
        let (a, b, c) = (points[tri[0]], points[tri[1]], points[tri[2]]);
        0.5 * (b - a).perp_dot(c - a)
    }

    #[test]
    fn test_triangulate_square() {
        let pts = square();
        let tris = triangulate_polygon(&pts);
        assert_eq!(tris.len(), 2);
        let total: f32 = tris.iter().map(|t| triangle_area(&pts, t)).sum();
        assert!((total - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_triangulate_concave() {
        // L-shape, 5x5 minus a 3x3 corner.
        let pts = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(5.0, 0.0),
            Vec2::new(5.0, 2.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(2.0, 5.0),
            Vec2::new(0.0, 5.0),
        ];
        let tris = triangulate_polygon(&pts);
        assert_eq!(tris.len(), 4);
        let total: f32 = tris.iter().map(|t| triangle_area(&pts, t)).sum();
        assert!((total - 16.0).abs() < 1e-4);
        // Every emitted triangle is counter-clockwise.
        for t in &tris {
            assert!(triangle_area(&pts, t) > 0.0);
        }
    }

    #[test]
    fn test_triangulate_clockwise_input() {
        let mut pts = square();
        pts.reverse();
        let tris = triangulate_polygon(&pts);
        let total: f32 = tris.iter().map(|t| triangle_area(&pts, t)).sum();
        assert!((total - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_extrude_planar_face() {
        let pts: Vec<Vec3> = square()
            .into_iter()
            .map(|p| Vec3::new(p.x, 0.0, p.y))
            .collect();
        let mesh = extrude_polygon(&pts, Vec3::Y, 0.0);
        assert_eq!(mesh.triangle_count(), 2);
        for n in &mesh.normals {
            assert!((*n - Vec3::Y).length() < 1e-5);
        }
    }

    #[test]
    fn test_extrude_solid() {
        let pts: Vec<Vec3> = square()
            .into_iter()
            .map(|p| Vec3::new(p.x, 0.0, p.y))
            .collect();
        let mesh = extrude_polygon(&pts, Vec3::Y, 0.5);
        // 2 top + 2 bottom + 2 per side quad.
        assert_eq!(mesh.triangle_count(), 12);
        let b = mesh.compute_bounds();
        assert!((b.max.y - 0.5).abs() < 1e-5);
        assert!(b.min.y.abs() < 1e-5);
    }

    #[test]
    fn test_wall_panel_solid() {
        let mesh = wall_panel(4.0, 2.5, 0.1, &[]);
        assert_eq!(mesh.triangle_count(), 12);
        let b = mesh.compute_bounds();
        assert_eq!(b.max, Vec3::new(4.0, 2.5, 0.05));
    }

    #[test]
    fn test_wall_panel_with_hole() {
        let hole = Box2::new(Vec2::new(1.0, 0.5), Vec2::new(2.0, 2.0));
        let mesh = wall_panel(4.0, 2.5, 0.1, &[hole]);
        // Three strips; the middle strip splits into two rectangles.
        assert_eq!(mesh.triangle_count(), 4 * 12);
        // No vertex lands inside the hole's open interior.
        for p in &mesh.positions {
            let inside = p.x > 1.0 + 1e-4
                && p.x < 2.0 - 1e-4
                && p.y > 0.5 + 1e-4
                && p.y < 2.0 - 1e-4;
            assert!(!inside, "vertex {p} inside hole");
        }
    }

    #[test]
    fn test_wall_panel_door_hole_reaches_floor() {
        // A door: hole starting at y = 0 leaves only the lintel strip above.
        let hole = Box2::new(Vec2::new(1.0, 0.0), Vec2::new(2.0, 2.0));
        let mesh = wall_panel(4.0, 2.5, 0.1, &[hole]);
        assert_eq!(mesh.triangle_count(), 3 * 12);
    }
}
