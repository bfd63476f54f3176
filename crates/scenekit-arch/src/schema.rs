//! Serde schema for architecture description JSON.

use glam::{Vec2, Vec3};
use scenekit_scene::Box2;
use serde::{Deserialize, Serialize};

use crate::error::ArchError;

/// A full architecture description: coordinate frame, defaults, elements.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchDesc {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    /// Up axis override, `[x, y, z]`.
    #[serde(default)]
    pub up: Option<Vec3>,
    /// Front axis override, `[x, y, z]`.
    #[serde(default)]
    pub front: Option<Vec3>,
    /// Multiplier taking description units to meters.
    #[serde(default)]
    pub scale_to_meters: Option<f32>,
    #[serde(default)]
    pub defaults: Option<ArchDefaults>,
    #[serde(default)]
    pub elements: Vec<ElementDesc>,
    /// Shared material table referenced by elements; carried opaquely.
    #[serde(default)]
    pub materials: Vec<MaterialDesc>,
    /// Texture and image tables; carried opaquely for downstream layers.
    #[serde(default)]
    pub textures: Option<serde_json::Value>,
    #[serde(default)]
    pub images: Option<serde_json::Value>,
}

impl ArchDesc {
    /// Parse a description from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ArchError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Per-element-kind defaults carried by the description. Element fields
/// win over these, and these win over the creator's built-ins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchDefaults {
    #[serde(default, rename = "Wall")]
    pub wall: SurfaceDefaults,
    #[serde(default, rename = "Ceiling")]
    pub ceiling: SurfaceDefaults,
    #[serde(default, rename = "Floor")]
    pub floor: SurfaceDefaults,
    #[serde(default, rename = "Ground")]
    pub ground: SurfaceDefaults,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceDefaults {
    #[serde(default)]
    pub height: Option<f32>,
    #[serde(default)]
    pub depth: Option<f32>,
    #[serde(default)]
    pub extra_height: Option<f32>,
}

/// What an element is. Unrecognized type strings deserialize to `Unknown`
/// so one bad element never fails the whole description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementKind {
    Wall,
    Ceiling,
    Floor,
    Ground,
    #[serde(other)]
    Unknown,
}

/// Element point data: either one flat polygon / base line, or several
/// grouped polygons.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Points {
    Flat(Vec<Vec3>),
    Grouped(Vec<Vec<Vec3>>),
}

impl Default for Points {
    fn default() -> Self {
        Points::Flat(Vec::new())
    }
}

impl Points {
    /// View the points as polygon groups; a flat list becomes one group.
    pub fn groups(&self) -> Vec<&[Vec3]> {
        match self {
            Points::Flat(points) => {
                if points.is_empty() {
                    Vec::new()
                } else {
                    vec![points.as_slice()]
                }
            }
            Points::Grouped(groups) => groups.iter().map(Vec::as_slice).collect(),
        }
    }

    /// The first two points, for wall base segments.
    pub fn base_segment(&self) -> Option<(Vec3, Vec3)> {
        let groups = self.groups();
        let first = groups.first()?;
        match first {
            [a, b, ..] => Some((*a, *b)),
            _ => None,
        }
    }
}

/// A rectangular cutout in a wall, in wall-local coordinates (x along the
/// wall base, y up from the wall base).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoleDesc {
    pub id: String,
    #[serde(default, rename = "type")]
    pub kind: Option<HoleKind>,
    #[serde(rename = "box")]
    pub bbox: BoxDesc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoleKind {
    Door,
    Window,
    #[serde(other)]
    Unknown,
}

/// A 2D box as `{ "min": [x, y], "max": [x, y] }`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoxDesc {
    pub min: Vec2,
    pub max: Vec2,
}

impl From<BoxDesc> for Box2 {
    fn from(b: BoxDesc) -> Self {
        Box2::new(b.min, b.max)
    }
}

/// Opaque material descriptor surfaced on nodes; realization is out of
/// scope here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialDesc {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub diffuse: Option<String>,
    #[serde(default)]
    pub texture: Option<String>,
}

/// One architecture element.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDesc {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    #[serde(default)]
    pub room_id: Option<String>,
    #[serde(default)]
    pub points: Points,
    #[serde(default)]
    pub holes: Vec<HoleDesc>,
    #[serde(default)]
    pub height: Option<f32>,
    #[serde(default)]
    pub depth: Option<f32>,
    #[serde(default)]
    pub extra_height: Option<f32>,
    #[serde(default)]
    pub offset: Option<Vec3>,
    /// Explicit level; wins over the level parsed from the room id.
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub materials: Vec<MaterialDesc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wall_element() {
        let desc = ArchDesc::from_json(
            r#"{
                "version": "arch@1.0.2",
                "scaleToMeters": 1,
                "defaults": { "Wall": { "depth": 0.1, "extraHeight": 0.035 } },
                "elements": [
                    {
                        "id": "0_0",
                        "type": "Wall",
                        "roomId": "0_1",
                        "points": [[0, 0, 0], [5, 0, 0]],
                        "height": 2.7,
                        "holes": [
                            { "id": "door1", "type": "Door",
                              "box": { "min": [1.0, 0.0], "max": [2.0, 2.1] } }
                        ]
                    }
                ]
            }"#,
        )
        .unwrap();
        let el = &desc.elements[0];
        assert_eq!(el.kind, ElementKind::Wall);
        assert_eq!(el.room_id.as_deref(), Some("0_1"));
        assert_eq!(el.holes[0].kind, Some(HoleKind::Door));
        let (a, b) = el.points.base_segment().unwrap();
        assert_eq!(a, Vec3::ZERO);
        assert_eq!(b, Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(
            desc.defaults.unwrap().wall.extra_height,
            Some(0.035)
        );
    }

    #[test]
    fn test_grouped_points() {
        let desc = ArchDesc::from_json(
            r#"{
                "elements": [
                    {
                        "id": "f1", "type": "Floor",
                        "points": [[[0,0,0],[4,0,0],[4,0,4],[0,0,4]]]
                    }
                ]
            }"#,
        )
        .unwrap();
        let groups = desc.elements[0].points.groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 4);
    }

    #[test]
    fn test_unknown_element_kind() {
        let desc = ArchDesc::from_json(
            r#"{ "elements": [ { "id": "x", "type": "Railing", "points": [] } ] }"#,
        )
        .unwrap();
        assert_eq!(desc.elements[0].kind, ElementKind::Unknown);
    }
}
