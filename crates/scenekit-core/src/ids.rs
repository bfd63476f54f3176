//! Asset identifier types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors constructing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("identifier '{0}' is missing a '.' separating group and local id")]
    MissingSeparator(String),

    #[error("identifier '{0}' has an empty group or local id")]
    EmptyComponent(String),
}

/// A store-wide unique asset identifier: `<group>.<localId>`.
///
/// The group names the asset collection the record belongs to; the local id
/// is unique within that group. The split is on the *first* `.`, so local
/// ids may themselves contain dots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FullId {
    group: String,
    id: String,
}

impl FullId {
    /// Build a full id from a group name and a local id.
    pub fn new(group: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            id: id.into(),
        }
    }

    /// The asset group name.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// The local id within the group.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for FullId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.group, self.id)
    }
}

impl FromStr for FullId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (group, id) = s
            .split_once('.')
            .ok_or_else(|| IdError::MissingSeparator(s.to_string()))?;
        if group.is_empty() || id.is_empty() {
            return Err(IdError::EmptyComponent(s.to_string()));
        }
        Ok(Self::new(group, id))
    }
}

impl TryFrom<String> for FullId {
    type Error = IdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<FullId> for String {
    fn from(id: FullId) -> Self {
        id.to_string()
    }
}

/// Parse a `<level>_<room>` identifier into its numeric components.
///
/// Both components must be plain decimal digit runs; anything else
/// (including signs or extra separators) returns `None` and callers fall
/// back to level 0.
pub fn parse_level_room(room_id: &str) -> Option<(u32, u32)> {
    let (level, room) = room_id.split_once('_')?;
    if level.is_empty() || room.is_empty() {
        return None;
    }
    if !level.bytes().all(|b| b.is_ascii_digit()) || !room.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((level.parse().ok()?, room.parse().ok()?))
}
