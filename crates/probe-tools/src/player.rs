//! Local player tools.

use std::sync::Arc;

use probe_core::HostObject;
use probe_scene::{Character, GameObject, SceneError, World};
use serde_json::{Value as Json, json};

use crate::tools::success;
use crate::{BridgeTools, NoArgs, ToolError};

fn local_player(world: &World) -> Result<Arc<GameObject>, SceneError> {
    world.local_player().ok_or(SceneError::NoLocalPlayer)
}

impl BridgeTools {
    /// Health, max health and health as a percentage.
    pub fn player_get_health(&self, _args: NoArgs) -> Json {
        self.on_host("player_get_health", |world, _| {
            let player = local_player(world)?;
            let character = player.get_component::<Character>().ok_or_else(|| {
                ToolError::ComponentNotFound {
                    component: "Character".to_owned(),
                    available: player
                        .components()
                        .iter()
                        .map(|c| c.type_name().to_owned())
                        .collect(),
                }
            })?;
            let character = character.read();
            success(json!({
                "health": character.health,
                "maxHealth": character.max_health,
                "healthPercentage": character.health_percentage() * 100.0,
            }))
        })
    }

    /// World-space position of the local player.
    pub fn player_get_position(&self, _args: NoArgs) -> Json {
        self.on_host("player_get_position", |world, view| {
            let player = local_player(world)?;
            success(json!({ "position": view.vector(player.position()) }))
        })
    }
}
