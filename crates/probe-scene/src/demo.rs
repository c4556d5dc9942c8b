//! A small world with a player, creatures, lights and a prefab registry.

use probe_core::HostObject;
use probe_core::math::{Color, Quaternion, Vector3};

use crate::{
    Character, Faction, Light, LightType, Player, Rigidbody, SceneError, Singleton, World,
};

const LAYER_CHARACTER: i32 = 9;
const LAYER_PIECE: i32 = 10;
const LAYER_ITEM: i32 = 12;

const CREATURES: [(&str, Faction, f32); 5] = [
    ("Boar", Faction::AnimalsVeg, 10.0),
    ("Deer", Faction::AnimalsVeg, 10.0),
    ("Greydwarf", Faction::ForestMonsters, 40.0),
    ("Troll", Faction::ForestMonsters, 600.0),
    ("Skeleton", Faction::Undead, 40.0),
];

const ITEMS: [&str; 4] = ["Wood", "Stone", "Resin", "Flint"];

fn fire_light(intensity: f32, range: f32) -> Light {
    Light {
        light_type: LightType::Point,
        color: Color::new(1.0, 0.62, 0.28, 1.0),
        intensity,
        range,
    }
}

/// Build the demo world: one loaded scene with `_GameMain` (prefab registry
/// and console), the local player, a camp and a few creatures.
pub fn demo_world() -> Result<World, SceneError> {
    let mut world = World::new();
    let main = world.load_scene("main", "Assets/Scenes/main.unity", 1);

    let game_main = world.spawn("_GameMain", main)?;
    world.install_znet_scene(&game_main);
    world.install_console(&game_main);

    for (name, faction, health) in CREATURES {
        let prefab = world.add_prefab(name)?;
        prefab.state_mut().layer = LAYER_CHARACTER;
        world.add_component(&prefab, Character::new(name, faction, health));
        world.add_component(
            &prefab,
            Rigidbody {
                mass: health.max(20.0),
                ..Rigidbody::default()
            },
        );
        world.spawn_child(&prefab, "Visual")?;
    }
    for name in ITEMS {
        let prefab = world.add_prefab(name)?;
        prefab.state_mut().layer = LAYER_ITEM;
        world.add_component(&prefab, Rigidbody::default());
    }
    let torch = world.add_prefab("piece_groundtorch")?;
    torch.state_mut().layer = LAYER_PIECE;
    let flame = world.spawn_child(&torch, "fire")?;
    world.add_component(&flame, fire_light(1.0, 6.0));

    let player = world.spawn("Player", main)?;
    {
        let mut state = player.state_mut();
        state.layer = LAYER_CHARACTER;
        state.tag = "Player".to_owned();
    }
    player.set_local_position(Vector3::new(12.5, 31.0, -48.2));
    player.transform().write().local_rotation = Quaternion::from_yaw(90.0);
    world.add_component(&player, Character::new("Player", Faction::Players, 25.0));
    world.add_component(
        &player,
        Player {
            known_recipes: vec!["Club".to_owned(), "Torch".to_owned(), "Hammer".to_owned()],
            ..Player::new("Ragnar")
        },
    );
    world.add_component(
        &player,
        Rigidbody {
            mass: 80.0,
            ..Rigidbody::default()
        },
    );
    let visual = world.spawn_child(&player, "Visual")?;
    let lantern = world.spawn_child(&visual, "Lantern")?;
    lantern.set_local_position(Vector3::new(0.3, 1.2, 0.1));
    world.add_component(&lantern, fire_light(1.2, 8.0));
    world.set_local_player(&player);

    let sun = world.spawn("Directional Light", main)?;
    sun.state_mut().is_static = true;
    world.add_component(
        &sun,
        Light {
            light_type: LightType::Directional,
            color: Color::WHITE,
            intensity: 1.1,
            range: 10.0,
        },
    );

    let camp = world.spawn("Camp", main)?;
    camp.set_local_position(Vector3::new(20.0, 30.5, -40.0));
    let campfire = world.spawn_child(&camp, "Campfire")?;
    world.add_component(&campfire, fire_light(1.6, 10.0));
    let workbench = world.spawn_child(&camp, "Workbench")?;
    workbench.set_local_position(Vector3::new(3.0, 0.0, 1.0));
    workbench.state_mut().layer = LAYER_PIECE;

    if let Some(boar) = world.prefabs().into_iter().find(|p| p.name() == "Boar") {
        world.instantiate(&boar, Vector3::new(30.0, 30.0, -35.0))?;
    }

    world.register_singleton(Singleton::Plain {
        full_type_name: "ZRoutedRpc",
        hash_code: 48_213_377,
    });
    world.register_singleton(Singleton::Plain {
        full_type_name: "ZDOMan",
        hash_code: 17_044_921,
    });

    Ok(world)
}
