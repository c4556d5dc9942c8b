//! Console commands executed against the world.

use std::str::FromStr;
use std::sync::Arc;

use probe_core::math::Vector3;
use tracing::{info, warn};

use crate::{Character, ComponentCell, ComponentState, Player, SceneError, World};

const HELP: &str = "Commands: help, heal, god, damage <amount>, spawn <prefab> [count] [level], pos";

/// Most copies a single `spawn` may create.
const MAX_SPAWN_COUNT: u32 = 100;

impl World {
    /// Run one console command line and return its output.
    ///
    /// When a console is installed the line and its outcome are echoed into
    /// its history, errors included.
    pub fn run_console_command(&mut self, line: &str) -> Result<String, SceneError> {
        let result = self.execute_command(line.trim());
        match &result {
            Ok(output) => info!(command = line, output = %output, "console command"),
            Err(err) => warn!(command = line, %err, "console command failed"),
        }

        if let Some(console) = self.console() {
            let mut console = console.write();
            console.print(format!("> {line}"));
            match &result {
                Ok(output) if output.is_empty() => {}
                Ok(output) => console.print(output.clone()),
                Err(err) => console.print(err.to_string()),
            }
        }
        result
    }

    fn execute_command(&mut self, line: &str) -> Result<String, SceneError> {
        let mut args = line.split_whitespace();
        let Some(command) = args.next() else {
            return Ok(String::new());
        };

        match command.to_ascii_lowercase().as_str() {
            "help" => Ok(HELP.to_owned()),
            "heal" => {
                let character = self.player_component::<Character>()?;
                character.write().heal_full();
                Ok("Healed".to_owned())
            }
            "god" => {
                let player = self.player_component::<Player>()?;
                let mut player = player.write();
                player.god_mode = !player.god_mode;
                Ok(format!("God mode: {}", player.god_mode))
            }
            "damage" => {
                let amount: f32 = required(args.next(), "damage", "amount")?;
                let god_mode = self.player_component::<Player>()?.read().god_mode;
                let character = self.player_component::<Character>()?;
                let mut character = character.write();
                if god_mode {
                    return Ok("God mode is on, damage ignored".to_owned());
                }
                character.damage(amount);
                Ok(format!("Health: {:.1}", character.health))
            }
            "spawn" => {
                let name = args.next().ok_or(SceneError::MissingArgument {
                    command: "spawn",
                    argument: "prefab",
                })?;
                let count: u32 = optional(args.next(), 1, "spawn", "count")?;
                let level: i32 = optional(args.next(), 1, "spawn", "level")?;
                self.spawn_prefab(name, count.min(MAX_SPAWN_COUNT), level)?;
                Ok(format!("Spawning object {name}"))
            }
            "pos" => {
                let player = self.local_player().ok_or(SceneError::NoLocalPlayer)?;
                let p = player.position();
                Ok(format!("Player position ({:.1}, {:.1}, {:.1})", p.x, p.y, p.z))
            }
            _ => Err(SceneError::UnknownCommand(command.to_owned())),
        }
    }

    fn player_component<S: ComponentState>(&self) -> Result<Arc<ComponentCell<S>>, SceneError> {
        self.local_player()
            .and_then(|player| player.get_component::<S>())
            .ok_or(SceneError::NoLocalPlayer)
    }

    /// Instantiate `count` copies of a prefab in a row in front of the
    /// player, or at the origin when there is none.
    fn spawn_prefab(&mut self, name: &str, count: u32, level: i32) -> Result<(), SceneError> {
        let registry = self
            .znet_scene()
            .ok_or(SceneError::NotAvailable("ZNetScene"))?;
        let prefab = registry
            .read()
            .get_prefab(name)
            .ok_or_else(|| SceneError::PrefabNotFound(name.to_owned()))?;

        let origin = self.local_player().map_or(Vector3::ZERO, |player| {
            player.position() + player.rotation().rotate(Vector3::new(0.0, 0.0, 2.0))
        });

        for index in 0..count {
            let position = origin + Vector3::new(index as f32, 0.0, 0.0);
            let copy = self.instantiate(&prefab, position)?;
            if let Some(character) = copy.get_component::<Character>() {
                character.write().level = level;
            }
        }
        Ok(())
    }
}

fn required<T: FromStr>(
    value: Option<&str>,
    command: &'static str,
    argument: &'static str,
) -> Result<T, SceneError> {
    let value = value.ok_or(SceneError::MissingArgument { command, argument })?;
    value.parse().map_err(|_| SceneError::InvalidArgument {
        command,
        argument,
        value: value.to_owned(),
    })
}

fn optional<T: FromStr>(
    value: Option<&str>,
    default: T,
    command: &'static str,
    argument: &'static str,
) -> Result<T, SceneError> {
    match value {
        Some(_) => required(value, command, argument),
        None => Ok(default),
    }
}
