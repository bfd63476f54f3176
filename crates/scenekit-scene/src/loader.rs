//! Scene instance loading.
//!
//! Loading runs in two phases: every instance's geometry is resolved first
//! (in any order, successes and failures both counted), and the graph is
//! assembled exactly once when the last resolution lands. Assembly is
//! best-effort: failed instances are skipped and their children become
//! roots.

use scenekit_core::{EventBus, FullId};

use crate::desc::{InstanceDesc, SceneDesc};
use crate::error::{ResolveError, SceneError};
use crate::geometry::TriangleMesh;
use crate::graph::{NodeMetadata, SceneGraph, SceneNode};

/// Where a load currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    /// Declared, nothing resolved yet.
    Pending,
    /// Resolutions outstanding.
    Loading,
    /// Every instance resolved or failed; assembly about to run.
    AllResolved,
    /// Graph built. Terminal.
    Assembled,
}

/// Events published on the load's bus.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    ModelLoaded { index: usize },
    ModelLoadError { index: usize },
    SceneLoaded,
}

/// Source of instance geometry.
pub trait AssetResolver {
    /// Produce the mesh for one asset. `format` is the instance's optional
    /// geometry format hint.
    fn resolve(&self, id: &FullId, format: Option<&str>) -> Result<TriangleMesh, ResolveError>;
}

/// State machine for one scene load.
pub struct SceneLoad {
    instances: Vec<InstanceDesc>,
    scan_count: usize,
    resolved: Vec<Option<TriangleMesh>>,
    failed: Vec<bool>,
    loaded: usize,
    errored: usize,
    phase: LoadPhase,
    events: EventBus<SceneEvent>,
    graph: Option<SceneGraph>,
    node_for: Vec<Option<usize>>,
}

impl SceneLoad {
    /// Declare a load for every instance in the description. An empty
    /// description assembles immediately.
    pub fn begin(desc: &SceneDesc) -> Self {
        let instances = desc.instances();
        let total = instances.len();
        let mut load = Self {
            instances,
            scan_count: usize::from(desc.scan.is_some()),
            resolved: (0..total).map(|_| None).collect(),
            failed: vec![false; total],
            loaded: 0,
            errored: 0,
            phase: if total == 0 {
                LoadPhase::Pending
            } else {
                LoadPhase::Loading
            },
            events: EventBus::new(),
            graph: None,
            node_for: vec![None; total],
        };
        if total == 0 {
            load.complete();
        }
        load
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn events(&self) -> &EventBus<SceneEvent> {
        &self.events
    }

    pub fn total(&self) -> usize {
        self.instances.len()
    }

    pub fn loaded(&self) -> usize {
        self.loaded
    }

    pub fn errored(&self) -> usize {
        self.errored
    }

    /// The assembled graph, once the load reaches [`LoadPhase::Assembled`].
    pub fn graph(&self) -> Option<&SceneGraph> {
        self.graph.as_ref()
    }

    /// Take ownership of the assembled graph.
    pub fn take_graph(&mut self) -> Option<SceneGraph> {
        self.graph.take()
    }

    /// Graph node built for instance `index`, if the instance made it into
    /// the scene.
    pub fn node_for(&self, index: usize) -> Option<usize> {
        self.node_for.get(index).copied().flatten()
    }

    /// Record a successful resolution. Out-of-order calls are fine; the
    /// final one triggers assembly.
    pub fn resolve_ok(&mut self, index: usize, mesh: TriangleMesh) -> Result<(), SceneError> {
        self.check_index(index)?;
        if self.phase != LoadPhase::Loading || self.slot_done(index) {
            // Late or duplicate resolutions from a superseded load are
            // dropped rather than corrupting the counters.
            log::warn!("ignoring resolution for instance {index} in phase {:?}", self.phase);
            return Ok(());
        }
        self.resolved[index] = Some(mesh);
        self.loaded += 1;
        self.events.publish(SceneEvent::ModelLoaded { index });
        self.maybe_complete();
        Ok(())
    }

    /// Record a failed resolution. The instance is skipped at assembly.
    pub fn resolve_err(&mut self, index: usize, reason: &str) -> Result<(), SceneError> {
        self.check_index(index)?;
        if self.phase != LoadPhase::Loading || self.slot_done(index) {
            log::warn!("ignoring failure for instance {index} in phase {:?}", self.phase);
            return Ok(());
        }
        log::error!(
            "failed to load instance {index} ({}): {reason}",
            self.instances[index].full_id
        );
        self.failed[index] = true;
        self.errored += 1;
        self.events.publish(SceneEvent::ModelLoadError { index });
        self.maybe_complete();
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), SceneError> {
        if index >= self.instances.len() {
            return Err(SceneError::InstanceOutOfRange {
                index,
                total: self.instances.len(),
            });
        }
        Ok(())
    }

    fn slot_done(&self, index: usize) -> bool {
        self.failed[index] || self.resolved[index].is_some()
    }

    fn maybe_complete(&mut self) {
        if self.loaded + self.errored == self.instances.len() {
            self.complete();
        }
    }

    fn complete(&mut self) {
        self.phase = LoadPhase::AllResolved;
        self.assemble();
        self.phase = LoadPhase::Assembled;
        self.events.publish(SceneEvent::SceneLoaded);
    }

    fn assemble(&mut self) {
        let mut graph = SceneGraph::new();

        // First pass: one root node per surviving instance, local transform
        // set to the instance's world transform.
        for (index, inst) in self.instances.iter().enumerate() {
            let Some(mesh) = self.resolved[index].take() else {
                continue;
            };
            let world = match inst.world_transform() {
                Ok(m) => m,
                Err(err) => {
                    log::error!("skipping instance {index} ({}): {err}", inst.full_id);
                    continue;
                }
            };
            let mesh_idx = graph.add_mesh(mesh);
            let name = inst
                .name
                .clone()
                .unwrap_or_else(|| inst.full_id.to_string());
            let kind = if index < self.scan_count { "scan" } else { "object" };
            let mut node = SceneNode::new(name)
                .with_transform(world)
                .with_mesh(mesh_idx)
                .with_metadata(NodeMetadata {
                    id: Some(inst.full_id.to_string()),
                    kind: Some(kind.to_string()),
                    instance_index: Some(index),
                    ..Default::default()
                });
            node.visible = inst.visible;
            self.node_for[index] = Some(graph.add_root(node));
        }

        // Second pass: honor parent links where both ends survived.
        // `attach` re-expresses the child in the parent's frame, so world
        // placement is unchanged. Children of failed parents stay roots.
        for (index, inst) in self.instances.iter().enumerate() {
            let (Some(child), Some(parent_idx)) = (self.node_for[index], inst.parent()) else {
                continue;
            };
            if parent_idx == index {
                log::warn!("instance {index} names itself as parent; leaving it a root");
                continue;
            }
            let Some(parent) = self.node_for.get(parent_idx).copied().flatten() else {
                log::warn!(
                    "instance {index} parent {parent_idx} missing from scene; leaving it a root"
                );
                continue;
            };
            if let Err(err) = graph.attach(child, parent) {
                log::error!("could not parent instance {index}: {err}");
            }
        }

        self.graph = Some(graph);
    }
}

/// Drive a whole load synchronously against a resolver.
pub fn load_scene(desc: &SceneDesc, resolver: &impl AssetResolver) -> SceneLoad {
    let mut load = SceneLoad::begin(desc);
    let instances = desc.instances();
    for (index, inst) in instances.iter().enumerate() {
        match resolver.resolve(&inst.full_id, inst.format.as_deref()) {
            Ok(mesh) => {
                // Index range is by construction valid here.
                let _ = load.resolve_ok(index, mesh);
            }
            Err(err) => {
                let _ = load.resolve_err(index, &err.to_string());
            }
        }
    }
    load
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desc::InstanceDesc;
    use glam::{Mat4, Vec3};
    use std::collections::HashMap;

    struct MapResolver {
        meshes: HashMap<String, TriangleMesh>,
    }

    impl MapResolver {
        fn with_ids(ids: &[&str]) -> Self {
            let meshes = ids
                .iter()
                .map(|id| (id.to_string(), unit_triangle()))
                .collect();
            Self { meshes }
        }
    }

    impl AssetResolver for MapResolver {
        fn resolve(
            &self,
            id: &FullId,
            _format: Option<&str>,
        ) -> Result<TriangleMesh, ResolveError> {
            self.meshes
                .get(&id.to_string())
                .cloned()
                .ok_or_else(|| ResolveError::NotFound(id.clone()))
        }
    }

    fn unit_triangle() -> TriangleMesh {
        let mut m = TriangleMesh::new();
        m.push_vertex(Vec3::ZERO, Vec3::Z);
        m.push_vertex(Vec3::X, Vec3::Z);
        m.push_vertex(Vec3::Y, Vec3::Z);
        m.push_triangle(0, 1, 2);
        m
    }

    fn desc_with(ids: &[&str]) -> SceneDesc {
        SceneDesc {
            format: Some("objects".to_string()),
            objects: ids
                .iter()
                .map(|id| InstanceDesc::new(id.parse().unwrap()))
                .collect(),
            scan: None,
        }
    }

    fn drain(load: &SceneLoad) -> Vec<SceneEvent> {
        load.events().drain()
    }

    #[test]
    fn test_empty_scene_assembles_immediately() {
        let load = SceneLoad::begin(&SceneDesc::default());
        assert_eq!(load.phase(), LoadPhase::Assembled);
        assert!(load.graph().unwrap().is_empty());
        assert_eq!(drain(&load), vec![SceneEvent::SceneLoaded]);
    }

    #[test]
    fn test_out_of_order_resolution() {
        let desc = desc_with(&["g.a", "g.b", "g.c"]);
        let mut load = SceneLoad::begin(&desc);
        assert_eq!(load.phase(), LoadPhase::Loading);

        load.resolve_ok(2, unit_triangle()).unwrap();
        load.resolve_ok(0, unit_triangle()).unwrap();
        assert_eq!(load.phase(), LoadPhase::Loading);
        assert!(load.graph().is_none());

        load.resolve_ok(1, unit_triangle()).unwrap();
        assert_eq!(load.phase(), LoadPhase::Assembled);
        assert_eq!(load.graph().unwrap().len(), 3);
    }

    #[test]
    fn test_partial_failure_still_assembles_once() {
        let desc = desc_with(&["g.a", "g.b", "g.c"]);
        let mut load = SceneLoad::begin(&desc);
        load.resolve_ok(0, unit_triangle()).unwrap();
        load.resolve_err(1, "missing geometry").unwrap();
        load.resolve_ok(2, unit_triangle()).unwrap();

        assert_eq!(load.phase(), LoadPhase::Assembled);
        let graph = load.graph().unwrap();
        assert_eq!(graph.len(), 2);

        let events = drain(&load);
        let scene_loaded = events
            .iter()
            .filter(|e| **e == SceneEvent::SceneLoaded)
            .count();
        assert_eq!(scene_loaded, 1);
        assert!(events.contains(&SceneEvent::ModelLoadError { index: 1 }));
    }

    #[test]
    fn test_duplicate_resolution_ignored() {
        let desc = desc_with(&["g.a", "g.b"]);
        let mut load = SceneLoad::begin(&desc);
        load.resolve_ok(0, unit_triangle()).unwrap();
        load.resolve_ok(0, unit_triangle()).unwrap();
        assert_eq!(load.phase(), LoadPhase::Loading);
        assert_eq!(load.loaded(), 1);
    }

    #[test]
    fn test_out_of_range_index() {
        let desc = desc_with(&["g.a"]);
        let mut load = SceneLoad::begin(&desc);
        assert!(matches!(
            load.resolve_ok(5, unit_triangle()),
            Err(SceneError::InstanceOutOfRange { index: 5, total: 1 })
        ));
    }

    #[test]
    fn test_parenting_re_expresses_child() {
        let mut desc = desc_with(&["g.parent", "g.child"]);
        desc.objects[0].position = Some(Vec3::new(4.0, 0.0, 0.0));
        desc.objects[1].position = Some(Vec3::new(5.0, 1.0, 0.0));
        desc.objects[1].parent_index = Some(0);

        let load = load_scene(&desc, &MapResolver::with_ids(&["g.parent", "g.child"]));
        let graph = load.graph().unwrap();
        let child = load.node_for(1).unwrap();

        // World placement preserved, local expressed relative to parent.
        let world = graph.world_transform(child).unwrap();
        assert!((world.w_axis.truncate() - Vec3::new(5.0, 1.0, 0.0)).length() < 1e-6);
        assert_eq!(
            graph.node(child).unwrap().transform.w_axis.truncate(),
            Vec3::new(1.0, 1.0, 0.0)
        );
    }

    #[test]
    fn test_child_of_failed_parent_stays_root() {
        let mut desc = desc_with(&["g.parent", "g.child"]);
        desc.objects[1].parent_index = Some(0);

        // Resolver only knows the child.
        let load = load_scene(&desc, &MapResolver::with_ids(&["g.child"]));
        let graph = load.graph().unwrap();
        assert_eq!(graph.len(), 1);
        let child = load.node_for(1).unwrap();
        assert_eq!(graph.node(child).unwrap().parent, None);
        assert_eq!(graph.roots(), &[child]);
    }

    #[test]
    fn test_scan_prepended_and_tagged() {
        let mut desc = desc_with(&["g.a"]);
        desc.scan = Some(InstanceDesc::new("scans.r1".parse().unwrap()));

        let load = load_scene(&desc, &MapResolver::with_ids(&["g.a", "scans.r1"]));
        let graph = load.graph().unwrap();
        assert_eq!(graph.len(), 2);
        let scan = load.node_for(0).unwrap();
        assert_eq!(
            graph.node(scan).unwrap().metadata.kind.as_deref(),
            Some("scan")
        );
    }

    #[test]
    fn test_explicit_matrix_transform() {
        let mut desc = desc_with(&["g.a"]);
        desc.objects[0].transform = Some(
            Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0))
                .to_cols_array()
                .to_vec(),
        );
        let load = load_scene(&desc, &MapResolver::with_ids(&["g.a"]));
        let graph = load.graph().unwrap();
        let node = load.node_for(0).unwrap();
        assert_eq!(
            graph.world_transform(node).unwrap().w_axis.truncate(),
            Vec3::new(1.0, 2.0, 3.0)
        );
    }
}
