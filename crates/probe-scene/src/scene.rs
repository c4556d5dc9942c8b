//! Scenes, pseudo-scenes and the search filters that refer to them.

use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use crate::{GameObject, SceneError};

/// Host handle of a loaded scene.
pub type SceneHandle = i32;

/// Pseudo-scene holding objects that survive scene loads.
pub const DONT_DESTROY_ON_LOAD: SceneHandle = -12;

/// Pseudo-scene for hidden objects that belong to no real scene.
pub const HIDE_AND_DONT_SAVE: SceneHandle = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SceneKind {
    Normal,
    DontDestroyOnLoad,
    HideAndDontSave,
}

impl SceneKind {
    #[must_use]
    pub const fn of(handle: SceneHandle) -> Self {
        match handle {
            DONT_DESTROY_ON_LOAD => Self::DontDestroyOnLoad,
            HIDE_AND_DONT_SAVE => Self::HideAndDontSave,
            _ => Self::Normal,
        }
    }
}

/// A loaded scene and its root objects.
#[derive(Debug)]
pub struct Scene {
    pub(crate) handle: SceneHandle,
    pub(crate) name: String,
    pub(crate) path: String,
    pub(crate) build_index: i32,
    pub(crate) is_loaded: bool,
    pub(crate) roots: Vec<Arc<GameObject>>,
}

impl Scene {
    pub(crate) fn new(handle: SceneHandle, name: &str, path: &str, build_index: i32) -> Self {
        Self {
            handle,
            name: name.to_owned(),
            path: path.to_owned(),
            build_index,
            is_loaded: true,
            roots: Vec::new(),
        }
    }

    pub const fn handle(&self) -> SceneHandle {
        self.handle
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub const fn build_index(&self) -> i32 {
        self.build_index
    }

    pub const fn is_loaded(&self) -> bool {
        self.is_loaded
    }

    /// The hidden pseudo-scene is not a valid scene.
    pub const fn is_valid(&self) -> bool {
        self.handle != HIDE_AND_DONT_SAVE
    }

    pub const fn kind(&self) -> SceneKind {
        SceneKind::of(self.handle)
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    pub fn roots(&self) -> &[Arc<GameObject>] {
        &self.roots
    }
}

/// Which scenes an object search covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SceneFilter {
    #[default]
    Any,
    ActivelyLoaded,
    DontDestroyOnLoad,
    HideAndDontSave,
}

impl SceneFilter {
    /// Whether an object living in `scene` passes this filter.
    ///
    /// `None` is an object outside every scene, such as a prefab asset.
    #[must_use]
    pub const fn accepts(self, scene: Option<SceneHandle>) -> bool {
        match self {
            Self::Any => true,
            Self::ActivelyLoaded => matches!(scene, Some(handle) if handle >= 0),
            Self::DontDestroyOnLoad => matches!(scene, Some(DONT_DESTROY_ON_LOAD)),
            Self::HideAndDontSave => matches!(scene, None | Some(HIDE_AND_DONT_SAVE)),
        }
    }
}

impl FromStr for SceneFilter {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant(
            "scene filter",
            s,
            &[
                ("Any", Self::Any),
                ("ActivelyLoaded", Self::ActivelyLoaded),
                ("DontDestroyOnLoad", Self::DontDestroyOnLoad),
                ("HideAndDontSave", Self::HideAndDontSave),
            ],
        )
    }
}

/// Where in the hierarchy a searched object may sit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChildFilter {
    #[default]
    Any,
    RootObject,
    HasParent,
}

impl ChildFilter {
    #[must_use]
    pub const fn accepts(self, has_parent: bool) -> bool {
        match self {
            Self::Any => true,
            Self::RootObject => !has_parent,
            Self::HasParent => has_parent,
        }
    }
}

impl FromStr for ChildFilter {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant(
            "child filter",
            s,
            &[
                ("Any", Self::Any),
                ("RootObject", Self::RootObject),
                ("HasParent", Self::HasParent),
            ],
        )
    }
}

/// Case-insensitive variant lookup. An empty string selects the first entry.
fn parse_variant<T: Copy>(kind: &'static str, s: &str, table: &[(&str, T)]) -> Result<T, SceneError> {
    let s = s.trim();
    if s.is_empty() {
        if let Some((_, first)) = table.first() {
            return Ok(*first);
        }
    }
    table
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(s))
        .map(|(_, value)| *value)
        .ok_or_else(|| SceneError::UnknownFilter {
            kind,
            value: s.to_owned(),
        })
}

/// Name of a physics layer, or an empty string if the layer is unnamed.
#[must_use]
pub const fn layer_name(layer: i32) -> &'static str {
    match layer {
        0 => "Default",
        1 => "TransparentFX",
        2 => "Ignore Raycast",
        4 => "Water",
        5 => "UI",
        8 => "effect",
        9 => "character",
        10 => "piece",
        11 => "terrain",
        12 => "item",
        14 => "character_net",
        15 => "character_ghost",
        16 => "hitbox",
        17 => "character_noenv",
        19 => "vehicle",
        _ => "",
    }
}
