//! Architecture assembly: meshed walls, floors, ceilings, and ground
//! planes built from a JSON description, grouped into rooms and levels.
//!
//! Wall holes (doors, windows) are subtracted from the wall geometry;
//! world-space hole annotations can be associated to wall segments with
//! [`associate_walls_with_holes`].

pub mod creator;
pub mod error;
pub mod holes;
pub mod schema;
pub mod tessellate;

pub use creator::{element_filter, Arch, ArchCreator, ArchOptions, CreatorDefaults, FilterOpts};
pub use error::ArchError;
pub use holes::{associate_walls_with_holes, clip_segment, HoleCandidate, WallHole, WallInfo};
pub use schema::{
    ArchDefaults, ArchDesc, BoxDesc, ElementDesc, ElementKind, HoleDesc, HoleKind, MaterialDesc,
    Points, SurfaceDefaults,
};
pub use tessellate::{extrude_polygon, triangulate_polygon, wall_panel};
