//! Serde schema for scene description JSON.

use glam::{Mat4, Quat, Vec3};
use scenekit_core::FullId;
use serde::{Deserialize, Serialize};

use crate::error::SceneError;

/// A scene description: a list of placed object instances, optionally with
/// a scan mesh shown alongside them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDesc {
    /// Description format tag (`"objects"`).
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub objects: Vec<InstanceDesc>,
    /// Scan instance, placed before the objects when present.
    #[serde(default)]
    pub scan: Option<InstanceDesc>,
}

impl SceneDesc {
    /// Parse a description from JSON text.
    pub fn from_json(text: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(text)?)
    }

    /// All instances in load order: the scan (if any) first, then objects.
    /// Instance indices used by the loader refer to this ordering.
    pub fn instances(&self) -> Vec<InstanceDesc> {
        let mut out = Vec::with_capacity(self.objects.len() + 1);
        if let Some(scan) = &self.scan {
            out.push(scan.clone());
        }
        out.extend(self.objects.iter().cloned());
        out
    }

    /// Whether instance `index` (in [`Self::instances`] order) is the scan.
    pub fn is_scan(&self, index: usize) -> bool {
        self.scan.is_some() && index == 0
    }
}

/// Uniform or per-axis scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScaleDesc {
    Uniform(f32),
    Vector(Vec3),
}

impl ScaleDesc {
    pub fn to_vec3(self) -> Vec3 {
        match self {
            ScaleDesc::Uniform(s) => Vec3::splat(s),
            ScaleDesc::Vector(v) => v,
        }
    }
}

fn default_visible() -> bool {
    true
}

/// One placed instance of an asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceDesc {
    pub full_id: FullId,
    #[serde(default)]
    pub name: Option<String>,
    /// Geometry format hint forwarded to the resolver.
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub position: Option<Vec3>,
    #[serde(default)]
    pub scale: Option<ScaleDesc>,
    /// Rotation as `[x, y, z, w]`.
    #[serde(default)]
    pub quaternion: Option<Quat>,
    /// Full world transform as 16 floats in column-major order. Takes
    /// precedence over position/scale/quaternion.
    #[serde(default)]
    pub transform: Option<Vec<f32>>,
    /// Index of the parent instance; negative or absent means root.
    #[serde(default)]
    pub parent_index: Option<i64>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub opacity: Option<f32>,
}

impl InstanceDesc {
    /// A bare instance at the origin.
    pub fn new(full_id: FullId) -> Self {
        Self {
            full_id,
            name: None,
            format: None,
            position: None,
            scale: None,
            quaternion: None,
            transform: None,
            parent_index: None,
            visible: true,
            color: None,
            opacity: None,
        }
    }

    /// The declared parent instance index, if it names a valid slot.
    pub fn parent(&self) -> Option<usize> {
        self.parent_index.and_then(|i| usize::try_from(i).ok())
    }

    /// The instance's world transform: the explicit 16-float matrix when
    /// given, otherwise composed from scale, quaternion, and position.
    pub fn world_transform(&self) -> Result<Mat4, SceneError> {
        if let Some(flat) = &self.transform {
            let cols: [f32; 16] = flat
                .as_slice()
                .try_into()
                .map_err(|_| SceneError::BadTransform { len: flat.len() })?;
            return Ok(Mat4::from_cols_array(&cols));
        }
        let scale = self.scale.map_or(Vec3::ONE, ScaleDesc::to_vec3);
        let rotation = self.quaternion.unwrap_or(Quat::IDENTITY);
        let position = self.position.unwrap_or(Vec3::ZERO);
        Ok(Mat4::from_scale_rotation_translation(scale, rotation, position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scene_desc() {
        let desc = SceneDesc::from_json(
            r#"{
                "format": "objects",
                "objects": [
                    { "fullId": "shapes.box", "position": [1, 2, 3], "scale": 2 },
                    { "fullId": "shapes.cone", "parentIndex": 0, "visible": false }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(desc.objects.len(), 2);
        assert_eq!(desc.objects[0].full_id.to_string(), "shapes.box");
        assert_eq!(desc.objects[0].scale, Some(ScaleDesc::Uniform(2.0)));
        assert_eq!(desc.objects[1].parent(), Some(0));
        assert!(!desc.objects[1].visible);
    }

    #[test]
    fn test_scan_prepended() {
        let desc = SceneDesc::from_json(
            r#"{
                "scan": { "fullId": "scans.room1" },
                "objects": [ { "fullId": "shapes.box" } ]
            }"#,
        )
        .unwrap();
        let instances = desc.instances();
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0].full_id.to_string(), "scans.room1");
        assert!(desc.is_scan(0));
        assert!(!desc.is_scan(1));
    }

    #[test]
    fn test_world_transform_prefers_matrix() {
        let mut inst = InstanceDesc::new("g.a".parse().unwrap());
        inst.position = Some(Vec3::new(9.0, 9.0, 9.0));
        inst.transform = Some(
            Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0))
                .to_cols_array()
                .to_vec(),
        );
        let m = inst.world_transform().unwrap();
        assert_eq!(m.w_axis.truncate(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_world_transform_composed() {
        let mut inst = InstanceDesc::new("g.a".parse().unwrap());
        inst.position = Some(Vec3::new(1.0, 0.0, 0.0));
        inst.scale = Some(ScaleDesc::Vector(Vec3::new(2.0, 1.0, 1.0)));
        let m = inst.world_transform().unwrap();
        assert_eq!(m.transform_point3(Vec3::X), Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn test_bad_transform_length() {
        let mut inst = InstanceDesc::new("g.a".parse().unwrap());
        inst.transform = Some(vec![1.0; 12]);
        assert!(matches!(
            inst.world_transform(),
            Err(SceneError::BadTransform { len: 12 })
        ));
    }

    #[test]
    fn test_negative_parent_is_root() {
        let mut inst = InstanceDesc::new("g.a".parse().unwrap());
        inst.parent_index = Some(-1);
        assert_eq!(inst.parent(), None);
    }
}
