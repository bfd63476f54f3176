//! Building architecture scene graphs from descriptions.

use glam::{Mat4, Vec3};
use indexmap::IndexMap;
use scenekit_core::parse_level_room;
use scenekit_scene::{Box2, NodeMetadata, SceneGraph, SceneNode, TriangleMesh};

use crate::error::ArchError;
use crate::holes::{merge_hole_boxes, WallHole};
use crate::schema::{ArchDesc, ElementDesc, ElementKind};
use crate::tessellate::{extrude_polygon, wall_panel};

const EPS: f32 = 1e-6;

/// Built-in fallback dimensions, in meters, used when neither the element
/// nor the description defaults specify a value.
#[derive(Debug, Clone, Copy)]
pub struct CreatorDefaults {
    pub wall_depth: f32,
    pub wall_height: f32,
    pub wall_extra_height: f32,
    pub ceiling_depth: f32,
    pub floor_depth: f32,
    pub ground_depth: f32,
}

impl Default for CreatorDefaults {
    fn default() -> Self {
        Self {
            wall_depth: 0.1,
            wall_height: 2.7,
            wall_extra_height: 0.035,
            ceiling_depth: 0.05,
            floor_depth: 0.05,
            ground_depth: 0.08,
        }
    }
}

/// Element selection for partial builds.
#[derive(Debug, Clone)]
pub struct FilterOpts {
    pub include_walls: bool,
    pub include_floors: bool,
    pub include_ceilings: bool,
    pub include_ground: bool,
    /// Keep only elements of this room.
    pub room_id: Option<String>,
    /// Keep only elements whose room sits on this level.
    pub level: Option<u32>,
    /// Keep only these element ids; overrides room and level selection.
    pub element_ids: Option<Vec<String>>,
}

impl Default for FilterOpts {
    fn default() -> Self {
        Self {
            include_walls: true,
            include_floors: true,
            include_ceilings: true,
            include_ground: true,
            room_id: None,
            level: None,
            element_ids: None,
        }
    }
}

/// Compile a selection into an element predicate.
pub fn element_filter(opts: &FilterOpts) -> impl Fn(&ElementDesc) -> bool + '_ {
    move |el| {
        let kind_ok = match el.kind {
            ElementKind::Wall => opts.include_walls,
            ElementKind::Floor => opts.include_floors,
            ElementKind::Ceiling => opts.include_ceilings,
            ElementKind::Ground => opts.include_ground,
            ElementKind::Unknown => true,
        };
        if !kind_ok {
            return false;
        }
        if let Some(ids) = &opts.element_ids {
            return ids.iter().any(|id| id == &el.id);
        }
        if let Some(room) = &opts.room_id {
            return el.room_id.as_deref() == Some(room.as_str());
        }
        if let Some(level) = opts.level {
            // Requires an actual level: explicit field or a `<level>_<room>`
            // room id. Roomless elements never match a level selection.
            let parsed = el.room_id.as_deref().and_then(parse_level_room).map(|(l, _)| l);
            return el.level.or(parsed) == Some(level);
        }
        true
    }
}

/// Build options.
#[derive(Debug, Clone, Default)]
pub struct ArchOptions {
    /// Insert level group nodes between the root and the rooms.
    pub group_rooms_to_levels: bool,
    pub filter: Option<FilterOpts>,
}

/// Assembled architecture: the graph plus lookup tables back into it.
#[derive(Debug)]
pub struct Arch {
    pub graph: SceneGraph,
    /// Room id → element node indices.
    pub rooms: IndexMap<String, Vec<usize>>,
    /// Node indices of roomless elements.
    pub outside: Vec<usize>,
    /// Element id → node index.
    pub elements_by_id: IndexMap<String, usize>,
    /// Hole id → ids of the walls carrying it.
    pub hole_to_walls: IndexMap<String, Vec<String>>,
    /// Level → room ids, when level grouping was requested.
    pub levels: Option<IndexMap<u32, Vec<String>>>,
}

/// Turns architecture descriptions into meshed scene graphs.
#[derive(Debug, Clone)]
pub struct ArchCreator {
    pub up: Vec3,
    pub front: Vec3,
    /// Unit multiplier applied on top of the description's scale.
    pub unit: f32,
    pub defaults: CreatorDefaults,
}

impl Default for ArchCreator {
    fn default() -> Self {
        Self {
            up: Vec3::Y,
            front: Vec3::Z,
            unit: 1.0,
            defaults: CreatorDefaults::default(),
        }
    }
}

struct BuiltElement {
    id: String,
    kind: &'static str,
    room_id: Option<String>,
    level: u32,
    hole_ids: Vec<String>,
    visible: bool,
    mesh: TriangleMesh,
    world: Mat4,
}

/// An element's level: explicit field first, else parsed from the room id,
/// else 0.
fn element_level(el: &ElementDesc) -> u32 {
    el.level.unwrap_or_else(|| {
        el.room_id
            .as_deref()
            .and_then(parse_level_room)
            .map_or(0, |(l, _)| l)
    })
}

impl ArchCreator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lateral axis of the creator's frame.
    pub fn left(&self) -> Vec3 {
        self.up.cross(self.front)
    }

    /// The planar coordinate pair for a point, chosen from the dominant up
    /// axis (up ≈ Y gives the XZ plane, and so on).
    pub fn planar(&self, p: Vec3) -> glam::Vec2 {
        planar_axis(self.up, p)
    }

    /// Build the full architecture graph for a description.
    pub fn create_arch(&self, desc: &ArchDesc, opts: &ArchOptions) -> Result<Arch, ArchError> {
        let scale = desc.scale_to_meters.unwrap_or(1.0) * self.unit;
        let up = desc.up.unwrap_or(self.up);
        let filter = opts.filter.as_ref().map(element_filter);

        let mut built = Vec::new();
        for el in &desc.elements {
            if let Some(f) = &filter {
                if !f(el) {
                    continue;
                }
            }
            let out = match el.kind {
                ElementKind::Wall => self.build_wall(el, desc, scale, up),
                ElementKind::Floor | ElementKind::Ceiling | ElementKind::Ground => {
                    self.build_surface(el, desc, scale, up)
                }
                ElementKind::Unknown => {
                    log::warn!("element {} has an unknown type; skipped", el.id);
                    None
                }
            };
            if let Some(b) = out {
                built.push(b);
            }
        }

        self.assemble(desc, opts, built)
    }

    fn assemble(
        &self,
        desc: &ArchDesc,
        opts: &ArchOptions,
        built: Vec<BuiltElement>,
    ) -> Result<Arch, ArchError> {
        let mut graph = SceneGraph::new();
        let root_name = desc.id.clone().unwrap_or_else(|| "arch".to_string());
        let root = graph.add_root(SceneNode::new(root_name).with_metadata(NodeMetadata {
            kind: Some("arch".to_string()),
            ..Default::default()
        }));

        let mut rooms: IndexMap<String, Vec<usize>> = IndexMap::new();
        let mut outside = Vec::new();
        let mut elements_by_id = IndexMap::new();
        let mut hole_to_walls: IndexMap<String, Vec<String>> = IndexMap::new();
        let mut levels: IndexMap<u32, Vec<String>> = IndexMap::new();
        let mut room_nodes: IndexMap<String, usize> = IndexMap::new();
        let mut level_nodes: IndexMap<u32, usize> = IndexMap::new();

        for b in built {
            let level = b.level;
            let parent = match &b.room_id {
                Some(room) => match room_nodes.get(room) {
                    Some(&n) => n,
                    None => {
                        let room_parent = if opts.group_rooms_to_levels {
                            match level_nodes.get(&level) {
                                Some(&n) => n,
                                None => {
                                    let n = graph.add_child(
                                        root,
                                        SceneNode::new(format!("level_{level}")).with_metadata(
                                            NodeMetadata {
                                                kind: Some("level".to_string()),
                                                level: Some(level),
                                                ..Default::default()
                                            },
                                        ),
                                    )?;
                                    level_nodes.insert(level, n);
                                    n
                                }
                            }
                        } else {
                            root
                        };
                        let n = graph.add_child(
                            room_parent,
                            SceneNode::new(room.clone()).with_metadata(NodeMetadata {
                                kind: Some("room".to_string()),
                                room_id: Some(room.clone()),
                                level: Some(level),
                                ..Default::default()
                            }),
                        )?;
                        room_nodes.insert(room.clone(), n);
                        levels.entry(level).or_default().push(room.clone());
                        n
                    }
                },
                None => root,
            };

            let mesh_idx = graph.add_mesh(b.mesh);
            let mut node = SceneNode::new(b.id.clone())
                .with_transform(b.world)
                .with_mesh(mesh_idx)
                .with_metadata(NodeMetadata {
                    id: Some(b.id.clone()),
                    kind: Some(b.kind.to_string()),
                    room_id: b.room_id.clone(),
                    level: Some(level),
                    hole_ids: b.hole_ids.clone(),
                    ..Default::default()
                });
            node.visible = b.visible;
            let idx = graph.add_child(parent, node)?;

            elements_by_id.insert(b.id.clone(), idx);
            match &b.room_id {
                Some(room) => rooms.entry(room.clone()).or_default().push(idx),
                None => outside.push(idx),
            }
            for hole_id in b.hole_ids {
                hole_to_walls.entry(hole_id).or_default().push(b.id.clone());
            }
        }

        Ok(Arch {
            graph,
            rooms,
            outside,
            elements_by_id,
            hole_to_walls,
            levels: opts.group_rooms_to_levels.then_some(levels),
        })
    }

    fn build_wall(
        &self,
        el: &ElementDesc,
        desc: &ArchDesc,
        scale: f32,
        up: Vec3,
    ) -> Option<BuiltElement> {
        let Some((a, b)) = el.points.base_segment() else {
            log::warn!("wall {} has fewer than two points; skipped", el.id);
            return None;
        };
        let (a, b) = (a * scale, b * scale);
        let (pa, pb) = (planar_axis(up, a), planar_axis(up, b));
        let width = pa.distance(pb);
        if width < EPS {
            log::warn!("wall {} has coincident endpoints; skipped", el.id);
            return None;
        }

        let wall_defaults = desc.defaults.as_ref().map(|d| &d.wall);
        let height = pick(el.height, wall_defaults.and_then(|d| d.height), scale)
            .unwrap_or(self.defaults.wall_height);
        let depth = pick(el.depth, wall_defaults.and_then(|d| d.depth), scale)
            .unwrap_or(self.defaults.wall_depth);
        let extra = pick(
            el.extra_height,
            wall_defaults.and_then(|d| d.extra_height),
            scale,
        )
        .unwrap_or(self.defaults.wall_extra_height);
        let total_height = height + extra;

        let holes: Vec<WallHole> = el
            .holes
            .iter()
            .map(|h| WallHole {
                id: h.id.clone(),
                kind: h.kind,
                bbox: Box2::new(h.bbox.min * scale, h.bbox.max * scale),
            })
            .collect();
        let mut boxes = Vec::new();
        let mut hole_ids = Vec::new();
        for h in merge_hole_boxes(holes) {
            let clamped = Box2::new(
                h.bbox.min.clamp(glam::Vec2::ZERO, glam::Vec2::new(width, total_height)),
                h.bbox.max.clamp(glam::Vec2::ZERO, glam::Vec2::new(width, total_height)),
            );
            if clamped.is_degenerate() {
                log::warn!("hole {} on wall {} is degenerate after clamping; dropped", h.id, el.id);
                continue;
            }
            boxes.push(clamped);
            hole_ids.push(h.id);
        }

        let mesh = wall_panel(width, total_height, depth, &boxes);

        // Wall frame: x along the base in the plane, y up, translated to
        // the first base point.
        let along = b - a;
        let x3 = (along - up * along.dot(up)).normalize_or_zero();
        let z3 = x3.cross(up);
        let world = Mat4::from_cols(
            x3.extend(0.0),
            up.extend(0.0),
            z3.extend(0.0),
            a.extend(1.0),
        );

        Some(BuiltElement {
            id: el.id.clone(),
            kind: "wall",
            room_id: el.room_id.clone(),
            level: element_level(el),
            hole_ids,
            visible: !el.hidden,
            mesh,
            world,
        })
    }

    fn build_surface(
        &self,
        el: &ElementDesc,
        desc: &ArchDesc,
        scale: f32,
        up: Vec3,
    ) -> Option<BuiltElement> {
        let (kind, surface_defaults, builtin_depth) = match el.kind {
            ElementKind::Floor => ("floor", desc.defaults.as_ref().map(|d| &d.floor), self.defaults.floor_depth),
            ElementKind::Ceiling => ("ceiling", desc.defaults.as_ref().map(|d| &d.ceiling), self.defaults.ceiling_depth),
            ElementKind::Ground => ("ground", desc.defaults.as_ref().map(|d| &d.ground), self.defaults.ground_depth),
            _ => return None,
        };
        let depth = pick(el.depth, surface_defaults.and_then(|d| d.depth), scale)
            .unwrap_or(builtin_depth);

        let mut mesh = TriangleMesh::new();
        for group in el.points.groups() {
            if group.len() < 3 {
                log::warn!("{kind} {} has a polygon with fewer than 3 points; skipped", el.id);
                continue;
            }
            let pts: Vec<Vec3> = group.iter().map(|p| *p * scale).collect();
            let mut part = extrude_polygon(&pts, up, depth);
            if el.kind != ElementKind::Ceiling && depth > EPS {
                // Floors and ground slabs extrude downward so their walking
                // surface stays at the given points.
                part.transform(&Mat4::from_translation(-up * depth));
            }
            mesh.merge(&part);
        }
        if mesh.is_empty() {
            log::warn!("{kind} {} produced no geometry; skipped", el.id);
            return None;
        }

        let world = match el.offset {
            Some(offset) => Mat4::from_translation(offset * scale),
            None => Mat4::IDENTITY,
        };

        Some(BuiltElement {
            id: el.id.clone(),
            kind,
            room_id: el.room_id.clone(),
            level: element_level(el),
            hole_ids: Vec::new(),
            visible: !el.hidden,
            mesh,
            world,
        })
    }
}

/// Element value over description default, scaling description-sourced
/// values into meters.
fn pick(element: Option<f32>, fallback: Option<f32>, scale: f32) -> Option<f32> {
    element.or(fallback).map(|v| v * scale)
}

fn planar_axis(up: Vec3, p: Vec3) -> glam::Vec2 {
    let a = up.abs();
    if a.y >= a.x && a.y >= a.z {
        glam::Vec2::new(p.x, p.z)
    } else if a.z >= a.x {
        glam::Vec2::new(p.x, p.y)
    } else {
        glam::Vec2::new(p.y, p.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_room_desc() -> ArchDesc {
        ArchDesc::from_json(
            r#"{
                "id": "house",
                "scaleToMeters": 1,
                "defaults": { "Wall": { "depth": 0.1, "extraHeight": 0.0 } },
                "elements": [
                    {
                        "id": "wall_a", "type": "Wall", "roomId": "0_1",
                        "points": [[0, 0, 0], [5, 0, 0]], "height": 2.7,
                        "holes": [
                            { "id": "door1", "type": "Door",
                              "box": { "min": [-1.0, 0.0], "max": [2.0, 2.1] } }
                        ]
                    },
                    {
                        "id": "wall_b", "type": "Wall", "roomId": "1_2",
                        "points": [[0, 0, 5], [5, 0, 5]], "height": 2.7
                    },
                    {
                        "id": "floor_1", "type": "Floor", "roomId": "0_1",
                        "points": [[[0,0,0],[5,0,0],[5,0,5],[0,0,5]]]
                    },
                    {
                        "id": "ground_1", "type": "Ground",
                        "points": [[[0,0,0],[10,0,0],[10,0,10],[0,0,10]]]
                    },
                    {
                        "id": "mystery", "type": "Railing",
                        "points": [[0,0,0],[1,0,0]]
                    }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_create_arch_full_pipeline() {
        let arch = ArchCreator::new()
            .create_arch(&two_room_desc(), &ArchOptions::default())
            .unwrap();

        // Unknown element skipped, four built.
        assert_eq!(arch.elements_by_id.len(), 4);
        assert!(!arch.elements_by_id.contains_key("mystery"));

        assert_eq!(arch.rooms.len(), 2);
        assert_eq!(arch.rooms.get("0_1").unwrap().len(), 2);
        assert_eq!(arch.outside.len(), 1);
        assert_eq!(
            arch.hole_to_walls.get("door1").unwrap(),
            &vec!["wall_a".to_string()]
        );
        assert!(arch.levels.is_none());

        let wall = arch.graph.node(arch.elements_by_id["wall_a"]).unwrap();
        assert_eq!(wall.metadata.kind.as_deref(), Some("wall"));
        assert_eq!(wall.metadata.hole_ids, vec!["door1".to_string()]);
    }

    #[test]
    fn test_hole_clamped_into_wall_bounds() {
        // door1's box starts at x = -1; the wall mesh must stay in [0, 5].
        let arch = ArchCreator::new()
            .create_arch(&two_room_desc(), &ArchOptions::default())
            .unwrap();
        let wall = arch.graph.node(arch.elements_by_id["wall_a"]).unwrap();
        let mesh = arch.graph.mesh(wall.mesh.unwrap()).unwrap();
        let bounds = mesh.compute_bounds();
        assert!(bounds.min.x >= -1e-5);
        assert!(bounds.max.x <= 5.0 + 1e-5);
        // The doorway is open: no vertex inside x in (0, 2), y in (0, 2.1).
        for p in &mesh.positions {
            let inside =
                p.x > 1e-4 && p.x < 2.0 - 1e-4 && p.y > 1e-4 && p.y < 2.1 - 1e-4;
            assert!(!inside, "vertex {p} inside doorway");
        }
    }

    #[test]
    fn test_degenerate_wall_skipped() {
        let desc = ArchDesc::from_json(
            r#"{ "elements": [
                { "id": "w", "type": "Wall", "points": [[1,0,1],[1,0,1]], "height": 2.7 }
            ] }"#,
        )
        .unwrap();
        let arch = ArchCreator::new()
            .create_arch(&desc, &ArchOptions::default())
            .unwrap();
        assert!(arch.elements_by_id.is_empty());
        // Only the root remains.
        assert_eq!(arch.graph.len(), 1);
    }

    #[test]
    fn test_hidden_element_invisible() {
        let desc = ArchDesc::from_json(
            r#"{ "elements": [
                { "id": "w", "type": "Wall", "hidden": true,
                  "points": [[0,0,0],[4,0,0]], "height": 2.5 }
            ] }"#,
        )
        .unwrap();
        let arch = ArchCreator::new()
            .create_arch(&desc, &ArchOptions::default())
            .unwrap();
        let node = arch.graph.node(arch.elements_by_id["w"]).unwrap();
        assert!(!node.visible);
    }

    #[test]
    fn test_scale_to_meters() {
        let desc = ArchDesc::from_json(
            r#"{ "scaleToMeters": 0.01, "elements": [
                { "id": "w", "type": "Wall",
                  "points": [[0,0,0],[500,0,0]], "height": 270 }
            ] }"#,
        )
        .unwrap();
        let arch = ArchCreator::new()
            .create_arch(&desc, &ArchOptions::default())
            .unwrap();
        let node = arch.graph.node(arch.elements_by_id["w"]).unwrap();
        let bounds = arch.graph.mesh(node.mesh.unwrap()).unwrap().compute_bounds();
        assert!((bounds.max.x - 5.0).abs() < 1e-4);
        // Height picks up the built-in extra height on top of 2.7.
        assert!((bounds.max.y - 2.735).abs() < 1e-3);
    }

    #[test]
    fn test_wall_height_from_desc_defaults() {
        let desc = ArchDesc::from_json(
            r#"{ "defaults": { "Wall": { "height": 4.0, "extraHeight": 0.0 } },
                 "elements": [
                { "id": "w", "type": "Wall", "points": [[0,0,0],[5,0,0]] }
            ] }"#,
        )
        .unwrap();
        let arch = ArchCreator::new()
            .create_arch(&desc, &ArchOptions::default())
            .unwrap();
        let node = arch.graph.node(arch.elements_by_id["w"]).unwrap();
        let bounds = arch.graph.mesh(node.mesh.unwrap()).unwrap().compute_bounds();
        assert!((bounds.max.y - 4.0).abs() < 1e-4);

        // An element height still wins over the description default.
        let desc = ArchDesc::from_json(
            r#"{ "defaults": { "Wall": { "height": 4.0, "extraHeight": 0.0 } },
                 "elements": [
                { "id": "w", "type": "Wall", "points": [[0,0,0],[5,0,0]], "height": 3.0 }
            ] }"#,
        )
        .unwrap();
        let arch = ArchCreator::new()
            .create_arch(&desc, &ArchOptions::default())
            .unwrap();
        let node = arch.graph.node(arch.elements_by_id["w"]).unwrap();
        let bounds = arch.graph.mesh(node.mesh.unwrap()).unwrap().compute_bounds();
        assert!((bounds.max.y - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_desc_up_override_sets_wall_plane() {
        // Z-up description: the base plane is XY. Under a Y-up projection
        // this wall would collapse to a point.
        let desc = ArchDesc::from_json(
            r#"{ "up": [0, 0, 1], "elements": [
                { "id": "w", "type": "Wall",
                  "points": [[0,0,0],[0,5,0]], "height": 2.0 }
            ] }"#,
        )
        .unwrap();
        let arch = ArchCreator::new()
            .create_arch(&desc, &ArchOptions::default())
            .unwrap();
        let node = arch.graph.node(arch.elements_by_id["w"]).unwrap();
        let bounds = arch.graph.mesh(node.mesh.unwrap()).unwrap().compute_bounds();
        assert!((bounds.max.x - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_level_grouping() {
        let opts = ArchOptions {
            group_rooms_to_levels: true,
            filter: None,
        };
        let arch = ArchCreator::new().create_arch(&two_room_desc(), &opts).unwrap();
        let levels = arch.levels.unwrap();
        assert_eq!(levels.get(&0).unwrap(), &vec!["0_1".to_string()]);
        assert_eq!(levels.get(&1).unwrap(), &vec!["1_2".to_string()]);

        // wall_b hangs under its room, which hangs under level 1.
        let wall_b = arch.elements_by_id["wall_b"];
        let room = arch.graph.node(wall_b).unwrap().parent.unwrap();
        let level = arch.graph.node(room).unwrap().parent.unwrap();
        assert_eq!(
            arch.graph.node(level).unwrap().metadata.kind.as_deref(),
            Some("level")
        );
        assert_eq!(arch.graph.node(level).unwrap().metadata.level, Some(1));
    }

    #[test]
    fn test_element_filter() {
        let desc = two_room_desc();

        let walls_only = FilterOpts {
            include_floors: false,
            include_ceilings: false,
            include_ground: false,
            ..Default::default()
        };
        let f = element_filter(&walls_only);
        let kept: Vec<&str> = desc
            .elements
            .iter()
            .filter(|el| f(el))
            .map(|el| el.id.as_str())
            .collect();
        assert_eq!(kept, vec!["wall_a", "wall_b", "mystery"]);

        let by_room = FilterOpts {
            room_id: Some("0_1".to_string()),
            ..Default::default()
        };
        let f = element_filter(&by_room);
        assert!(f(&desc.elements[0]));
        assert!(!f(&desc.elements[1]));

        let by_level = FilterOpts {
            level: Some(1),
            ..Default::default()
        };
        let f = element_filter(&by_level);
        assert!(!f(&desc.elements[0]));
        assert!(f(&desc.elements[1]));

        // Level selection needs a resolvable level: roomless elements are
        // excluded even for level 0.
        let by_level_zero = FilterOpts {
            level: Some(0),
            ..Default::default()
        };
        let f = element_filter(&by_level_zero);
        let kept: Vec<&str> = desc
            .elements
            .iter()
            .filter(|el| f(el))
            .map(|el| el.id.as_str())
            .collect();
        assert_eq!(kept, vec!["wall_a", "floor_1"]);

        let by_ids = FilterOpts {
            element_ids: Some(vec!["floor_1".to_string()]),
            ..Default::default()
        };
        let f = element_filter(&by_ids);
        let kept: Vec<&str> = desc
            .elements
            .iter()
            .filter(|el| f(el))
            .map(|el| el.id.as_str())
            .collect();
        assert_eq!(kept, vec!["floor_1"]);
    }

    #[test]
    fn test_wall_world_frame() {
        // Wall along +Z: local x maps onto world z.
        let desc = ArchDesc::from_json(
            r#"{ "elements": [
                { "id": "w", "type": "Wall",
                  "points": [[2,0,1],[2,0,4]], "height": 2.0 }
            ] }"#,
        )
        .unwrap();
        let arch = ArchCreator::new()
            .create_arch(&desc, &ArchOptions::default())
            .unwrap();
        let node = arch.graph.node(arch.elements_by_id["w"]).unwrap();
        let origin = node.transform.transform_point3(Vec3::ZERO);
        let far = node.transform.transform_point3(Vec3::new(3.0, 0.0, 0.0));
        assert!((origin - Vec3::new(2.0, 0.0, 1.0)).length() < 1e-5);
        assert!((far - Vec3::new(2.0, 0.0, 4.0)).length() < 1e-5);
    }
}
