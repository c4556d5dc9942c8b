//! Built-in component states.

use std::sync::Arc;

use probe_core::math::{Color, Quaternion, Vector3};
use probe_core::{HostObject, Introspectable, ToValue};

use crate::{ComponentState, GameObject};

/// Local placement relative to the parent object.
#[derive(Debug, Clone, Introspectable)]
pub struct Transform {
    pub local_position: Vector3,
    pub local_rotation: Quaternion,
    pub local_scale: Vector3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            local_position: Vector3::ZERO,
            local_rotation: Quaternion::IDENTITY,
            local_scale: Vector3::ONE,
        }
    }
}

impl ComponentState for Transform {
    const TYPE_NAME: &'static str = "Transform";
    const FULL_TYPE_NAME: &'static str = "UnityEngine.Transform";
}

#[derive(Debug, Clone, Introspectable)]
#[introspect(property(speed: f32))]
pub struct Rigidbody {
    pub mass: f32,
    pub velocity: Vector3,
    pub drag: f32,
    pub use_gravity: bool,
    pub is_kinematic: bool,
}

impl Rigidbody {
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

impl Default for Rigidbody {
    fn default() -> Self {
        Self {
            mass: 1.0,
            velocity: Vector3::ZERO,
            drag: 0.0,
            use_gravity: true,
            is_kinematic: false,
        }
    }
}

impl ComponentState for Rigidbody {
    const TYPE_NAME: &'static str = "Rigidbody";
    const FULL_TYPE_NAME: &'static str = "UnityEngine.Rigidbody";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ToValue)]
pub enum LightType {
    Spot,
    Directional,
    Point,
    Area,
}

#[derive(Debug, Clone, Introspectable)]
pub struct Light {
    #[introspect(rename = "type")]
    pub light_type: LightType,
    pub color: Color,
    pub intensity: f32,
    pub range: f32,
}

impl ComponentState for Light {
    const TYPE_NAME: &'static str = "Light";
    const FULL_TYPE_NAME: &'static str = "UnityEngine.Light";
    const IS_BEHAVIOUR: bool = true;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ToValue)]
pub enum Faction {
    Players,
    AnimalsVeg,
    ForestMonsters,
    Undead,
    Demon,
    MountainMonsters,
    SeaMonsters,
    PlainsMonsters,
    Boss,
}

/// Anything with health: players, creatures, bosses.
#[derive(Debug, Clone, Introspectable)]
#[introspect(property(health_percentage: f32))]
pub struct Character {
    #[introspect(rename = "m_name")]
    pub display_name: String,
    #[introspect(rename = "m_faction")]
    pub faction: Faction,
    #[introspect(rename = "m_health")]
    pub max_health: f32,
    pub health: f32,
    #[introspect(rename = "m_level")]
    pub level: i32,
    #[introspect(rename = "m_tamed")]
    pub tamed: bool,
}

impl Character {
    pub fn new(display_name: impl Into<String>, faction: Faction, max_health: f32) -> Self {
        Self {
            display_name: display_name.into(),
            faction,
            max_health,
            health: max_health,
            level: 1,
            tamed: false,
        }
    }

    /// Health as a fraction of max health, in `[0, 1]`.
    pub fn health_percentage(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            (self.health / self.max_health).clamp(0.0, 1.0)
        }
    }

    pub fn heal_full(&mut self) {
        self.health = self.max_health;
    }

    /// Apply damage; health never drops below zero.
    pub fn damage(&mut self, amount: f32) {
        self.health = (self.health - amount).max(0.0);
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }
}

impl ComponentState for Character {
    const TYPE_NAME: &'static str = "Character";
    const FULL_TYPE_NAME: &'static str = "Character";
    const IS_BEHAVIOUR: bool = true;
}

/// Player-only state layered on top of [`Character`].
#[derive(Debug, Clone, Introspectable)]
pub struct Player {
    #[introspect(rename = "m_playerName")]
    pub player_name: String,
    #[introspect(rename = "m_godMode")]
    pub god_mode: bool,
    #[introspect(rename = "m_stamina")]
    pub stamina: f32,
    #[introspect(rename = "m_maxStamina")]
    pub max_stamina: f32,
    #[introspect(rename = "m_knownRecipes")]
    pub known_recipes: Vec<String>,
}

impl Player {
    pub fn new(player_name: impl Into<String>) -> Self {
        Self {
            player_name: player_name.into(),
            god_mode: false,
            stamina: 75.0,
            max_stamina: 75.0,
            known_recipes: Vec::new(),
        }
    }
}

impl ComponentState for Player {
    const TYPE_NAME: &'static str = "Player";
    const FULL_TYPE_NAME: &'static str = "Player";
    const IS_BEHAVIOUR: bool = true;
}

/// Network prefab registry.
#[derive(Debug, Clone, Default, Introspectable)]
pub struct ZNetScene {
    #[introspect(rename = "m_prefabs")]
    pub prefabs: Vec<Arc<GameObject>>,
}

impl ZNetScene {
    /// Prefab by exact name.
    pub fn get_prefab(&self, name: &str) -> Option<Arc<GameObject>> {
        self.prefabs.iter().find(|p| p.name() == name).cloned()
    }

    pub fn prefab_names(&self) -> Vec<String> {
        self.prefabs.iter().map(|p| p.name()).collect()
    }
}

impl ComponentState for ZNetScene {
    const TYPE_NAME: &'static str = "ZNetScene";
    const FULL_TYPE_NAME: &'static str = "ZNetScene";
    const IS_BEHAVIOUR: bool = true;
}

/// In-game console. Output lines are kept in `history`.
#[derive(Debug, Clone, Default, Introspectable)]
pub struct Console {
    #[introspect(rename = "m_chatBuffer")]
    pub history: Vec<String>,
    #[introspect(rename = "m_cheat")]
    pub cheats: bool,
}

impl Console {
    /// Lines kept before the oldest are dropped.
    pub const HISTORY_LIMIT: usize = 200;

    pub fn print(&mut self, line: impl Into<String>) {
        self.history.push(line.into());
        if self.history.len() > Self::HISTORY_LIMIT {
            let excess = self.history.len() - Self::HISTORY_LIMIT;
            self.history.drain(..excess);
        }
    }
}

impl ComponentState for Console {
    const TYPE_NAME: &'static str = "Console";
    const FULL_TYPE_NAME: &'static str = "Console";
    const IS_BEHAVIOUR: bool = true;
}

/// Marker behaviour for the object that owns the main-loop dispatcher.
#[derive(Debug, Clone, Default, Introspectable)]
pub struct MainThreadDispatcher {
    pub drained_actions: u64,
    pub failed_actions: u64,
}

impl ComponentState for MainThreadDispatcher {
    const TYPE_NAME: &'static str = "MainThreadDispatcher";
    const FULL_TYPE_NAME: &'static str = "ProbeBridge.MainThreadDispatcher";
    const IS_BEHAVIOUR: bool = true;
}
