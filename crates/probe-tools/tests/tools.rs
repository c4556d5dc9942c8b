//! Tool calls against the demo world, served by a live host thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use probe_core::{BridgeConfig, DispatchHandle, HostObject, IdentityCache, MainLoopDispatcher};
use probe_scene::{World, demo_world};
use probe_tools::{BridgeTools, ToolRegistry};
use serde_json::{Value as Json, json};

/// Host loop on its own thread, draining the dispatcher until dropped.
struct Host {
    handle: DispatchHandle<World>,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Host {
    fn start(mut world: World) -> Self {
        let dispatcher = MainLoopDispatcher::<World>::new();
        let handle = dispatcher.handle();
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let thread = thread::spawn(move || {
            while !flag.load(Ordering::Acquire) {
                dispatcher.drain(&mut world);
                thread::sleep(Duration::from_millis(1));
            }
        });
        Self {
            handle,
            stop,
            thread: Some(thread),
        }
    }

    fn registry(&self) -> ToolRegistry {
        let tools = BridgeTools::new(
            self.handle.clone(),
            Arc::new(IdentityCache::new()),
            &BridgeConfig::default(),
        );
        ToolRegistry::new(tools)
    }
}

impl Drop for Host {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            thread.join().unwrap();
        }
    }
}

fn demo() -> (Host, ToolRegistry) {
    let host = Host::start(demo_world().unwrap());
    let registry = host.registry();
    (host, registry)
}

fn names(items: &Json) -> Vec<&str> {
    items
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap())
        .collect()
}

fn find_one(registry: &ToolRegistry, name: &str) -> i64 {
    let reply = registry.call(
        "unity_search_objects",
        json!({"nameFilter": name, "typeFilter": "GameObject"}),
    );
    assert_eq!(reply["success"], true, "{reply}");
    reply["results"][0]["instanceId"].as_i64().unwrap()
}

#[test]
fn test_list_names_every_tool() {
    let (_host, registry) = demo();
    let listed: Vec<&str> = registry.list().iter().map(|tool| tool.name).collect();
    assert_eq!(
        listed,
        vec![
            "unity_search_objects",
            "unity_search_singletons",
            "unity_get_loaded_scenes",
            "unity_get_scene_roots",
            "unity_inspect_object",
            "unity_read_component",
            "unity_get_children",
            "znetscene_search_prefabs",
            "znetscene_get_prefab",
            "znetscene_list_prefab_names",
            "player_get_health",
            "player_get_position",
            "run_command",
        ]
    );
}

#[test]
fn test_search_objects_covers_scene_and_prefabs() {
    let (_host, registry) = demo();
    let reply = registry.call(
        "unity_search_objects",
        json!({"nameFilter": "boar", "typeFilter": "GameObject"}),
    );

    assert_eq!(reply["success"], true);
    assert_eq!(reply["count"], 2);
    assert_eq!(reply["returnedCount"], 2);
    assert_eq!(names(&reply["results"]), vec!["Boar(Clone)", "Boar"]);
    assert!(reply["results"][0].get("components").is_none());
}

#[test]
fn test_search_objects_caps_results_but_counts_all() {
    let (_host, registry) = demo();
    let reply = registry.call(
        "unity_search_objects",
        json!({"typeFilter": "Light", "maxResults": 1}),
    );

    assert_eq!(reply["returnedCount"], 1);
    assert!(reply["count"].as_u64().unwrap() >= 4);
    assert_eq!(reply["results"][0]["type"], "UnityEngine.Light");
    assert_eq!(reply["results"][0]["enabled"], true);
}

#[test]
fn test_search_objects_rejects_unknown_filter() {
    let (_host, registry) = demo();
    let reply = registry.call("unity_search_objects", json!({"sceneFilter": "Nowhere"}));
    assert_eq!(
        reply,
        json!({"success": false, "error": "unknown scene filter 'Nowhere'"})
    );
}

#[test]
fn test_search_singletons() {
    let (_host, registry) = demo();

    let plain = registry.call("unity_search_singletons", json!({"typeFilter": "zdo"}));
    assert_eq!(plain["count"], 1);
    assert_eq!(plain["results"][0]["isUnityObject"], false);
    assert_eq!(plain["results"][0]["hashCode"], 17_044_921);

    let object = registry.call("unity_search_singletons", json!({"typeFilter": "znetscene"}));
    assert_eq!(object["results"][0]["isUnityObject"], true);
    assert_eq!(object["results"][0]["name"], "_GameMain");
}

#[test]
fn test_loaded_scenes_include_pseudo_scenes() {
    let (_host, registry) = demo();
    let reply = registry.call("unity_get_loaded_scenes", Json::Null);

    assert_eq!(reply["count"], 3);
    let scenes = &reply["scenes"];
    assert_eq!(scenes[0]["name"], "main");
    assert_eq!(scenes[0]["sceneType"], "Normal");
    assert_eq!(scenes[0]["rootCount"], 5);
    assert_eq!(scenes[1]["handle"], -12);
    assert_eq!(scenes[1]["sceneType"], "DontDestroyOnLoad");
    assert_eq!(scenes[2]["sceneType"], "HideAndDontSave");
    assert_eq!(scenes[2]["rootCount"], 0);
}

#[test]
fn test_scene_roots() {
    let (_host, registry) = demo();

    let active = registry.call("unity_get_scene_roots", json!({}));
    assert_eq!(
        names(&active["roots"]),
        vec!["_GameMain", "Player", "Directional Light", "Camp", "Boar(Clone)"]
    );

    let hidden = registry.call("unity_get_scene_roots", json!({"sceneHandle": -1}));
    assert_eq!(hidden["count"], 10);

    let missing = registry.call("unity_get_scene_roots", json!({"sceneHandle": 999}));
    assert_eq!(missing["error"], "Scene with handle 999 not found");
}

#[test]
fn test_inspect_game_object() {
    let (_host, registry) = demo();
    let player = find_one(&registry, "Player");

    let reply = registry.call("unity_inspect_object", json!({"instanceId": player}));
    assert_eq!(reply["success"], true);
    let data = &reply["data"];
    assert_eq!(data["name"], "Player");
    assert_eq!(data["tag"], "Player");
    assert_eq!(data["layer"], "character");
    assert_eq!(data["transform"]["position"]["x"], 12.5);
    assert_eq!(data["transform"]["position"]["y"], 31.0);
    let yaw = data["transform"]["rotation"]["y"].as_f64().unwrap();
    assert!((yaw - 90.0).abs() < 1e-3);
    assert_eq!(data["totalChildren"], 1);
    assert_eq!(data["children"][0]["name"], "Visual");
    assert_eq!(data["children"][0]["siblingIndex"], 0);

    let types: Vec<&str> = data["components"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["typeName"].as_str().unwrap())
        .collect();
    assert_eq!(types, vec!["Transform", "Character", "Player", "Rigidbody"]);
}

#[test]
fn test_inspect_component_dumps_members() {
    let (_host, registry) = demo();
    let player = find_one(&registry, "Player");
    let component = registry.call(
        "unity_read_component",
        json!({"gameObjectInstanceId": player, "componentType": "player", "includeMembers": false}),
    );
    let id = component["data"]["instanceId"].as_i64().unwrap();
    assert!(component["data"].get("members").is_none());

    let reply = registry.call("unity_inspect_object", json!({"instanceId": id}));
    let data = &reply["data"];
    assert_eq!(data["typeName"], "Player");
    assert_eq!(data["gameObjectName"], "Player");
    assert_eq!(data["gameObjectInstanceId"], player);
    assert_eq!(data["enabled"], true);
    assert_eq!(data["members"]["m_playerName"], "Ragnar");
    assert_eq!(
        data["members"]["m_knownRecipes"],
        json!({"type": "Vec<String>", "size": 3})
    );
}

#[test]
fn test_inspect_falls_back_to_scan() {
    let world = demo_world().unwrap();
    let player_id = world.local_player().unwrap().instance_id();
    let host = Host::start(world);
    let registry = host.registry();

    assert!(registry.tools().cache().resolve(player_id).is_none());
    let reply = registry.call("unity_inspect_object", json!({"instanceId": player_id}));
    assert_eq!(reply["data"]["name"], "Player");
    assert!(registry.tools().cache().resolve(player_id).is_some());
}

#[test]
fn test_inspect_unknown_id() {
    let (_host, registry) = demo();
    let reply = registry.call("unity_inspect_object", json!({"instanceId": 999_999}));
    assert_eq!(
        reply,
        json!({
            "success": false,
            "error": "Object with instanceId 999999 not found or was destroyed",
        })
    );
}

#[test]
fn test_destroyed_object_is_not_found() {
    let (host, registry) = demo();
    let camp = find_one(&registry, "Camp");

    let destroyed = host
        .handle
        .call_blocking(
            move |world: &mut World| {
                let go = world.find_game_object(i32::try_from(camp).unwrap()).unwrap();
                world.destroy(&go)
            },
            Duration::from_secs(5),
        )
        .unwrap();
    assert!(destroyed > 0);

    let reply = registry.call("unity_inspect_object", json!({"instanceId": camp}));
    assert_eq!(reply["success"], false);
}

#[test]
fn test_read_component_miss_lists_available() {
    let (_host, registry) = demo();
    let player = find_one(&registry, "Player");

    let hit = registry.call(
        "unity_read_component",
        json!({"gameObjectInstanceId": player, "componentType": "Character"}),
    );
    assert_eq!(hit["data"]["members"]["m_health"], 25.0);
    assert_eq!(hit["data"]["members"]["health_percentage"], 1.0);

    let miss = registry.call(
        "unity_read_component",
        json!({"gameObjectInstanceId": player, "componentType": "Collider"}),
    );
    assert_eq!(miss["success"], false);
    assert_eq!(miss["error"], "Component 'Collider' not found on GameObject");
    assert_eq!(
        miss["availableComponents"],
        json!(["Transform", "Character", "Player", "Rigidbody"])
    );
}

#[test]
fn test_read_component_needs_game_object() {
    let (_host, registry) = demo();
    let reply = registry.call(
        "unity_read_component",
        json!({"gameObjectInstanceId": 424_242, "componentType": "Transform"}),
    );
    assert_eq!(
        reply["error"],
        "GameObject with instanceId 424242 not found or was destroyed"
    );
}

#[test]
fn test_get_children() {
    let (_host, registry) = demo();
    let camp = find_one(&registry, "Camp");

    let reply = registry.call(
        "unity_get_children",
        json!({"parentInstanceId": camp, "includeComponents": true, "maxResults": 1}),
    );
    assert_eq!(reply["parentName"], "Camp");
    assert_eq!(reply["totalChildren"], 2);
    assert_eq!(reply["returnedCount"], 1);
    assert_eq!(reply["children"][0]["name"], "Campfire");
    assert_eq!(reply["children"][0]["path"], "Camp/Campfire");
    assert_eq!(reply["children"][0]["components"][1]["typeName"], "Light");
}

#[test]
fn test_prefab_tools() {
    let (_host, registry) = demo();

    let search = registry.call("znetscene_search_prefabs", json!({"nameFilter": "ROLL"}));
    assert_eq!(search["totalPrefabs"], 10);
    assert_eq!(search["matchCount"], 1);
    assert_eq!(search["prefabs"][0]["name"], "Troll");
    assert_eq!(search["prefabs"][0]["layer"], "character");
    assert!(search["prefabs"][0].get("components").is_none());

    let troll = registry.call("znetscene_get_prefab", json!({"prefabName": "Troll"}));
    assert_eq!(troll["prefab"]["childCount"], 1);
    assert_eq!(troll["prefab"]["components"][1]["typeName"], "Character");

    let missing = registry.call("znetscene_get_prefab", json!({"prefabName": "troll"}));
    assert_eq!(missing["error"], "Prefab 'troll' not found");

    let names = registry.call("znetscene_list_prefab_names", json!({"prefix": "S"}));
    assert_eq!(names["totalPrefabs"], 10);
    assert_eq!(names["names"], json!(["Skeleton", "Stone"]));
}

#[test]
fn test_prefab_tools_without_registry() {
    let mut world = World::new();
    world.load_scene("empty", "", 0);
    let host = Host::start(world);
    let registry = host.registry();

    let reply = registry.call("znetscene_list_prefab_names", json!({}));
    assert_eq!(
        reply,
        json!({"success": false, "error": "ZNetScene not available. Are you in-game?"})
    );
}

#[test]
fn test_player_tools() {
    let (_host, registry) = demo();

    let health = registry.call("player_get_health", json!({}));
    assert_eq!(
        health,
        json!({"success": true, "health": 25.0, "maxHealth": 25.0, "healthPercentage": 100.0})
    );

    let position = registry.call("player_get_position", json!({}));
    assert_eq!(position["position"]["x"], 12.5);
    assert_eq!(position["position"]["y"], 31.0);
}

#[test]
fn test_player_tools_without_player() {
    let host = Host::start(World::new());
    let registry = host.registry();
    let reply = registry.call("player_get_health", Json::Null);
    assert_eq!(reply["error"], "No local player found");
}

#[test]
fn test_run_command_is_queued_then_applied() {
    let (_host, registry) = demo();

    let reply = registry.call("run_command", json!({"command": "damage 5"}));
    assert_eq!(
        reply,
        json!({"success": true, "command": "damage 5", "queued": true})
    );

    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let health = registry.call("player_get_health", json!({}));
        if health["health"] == 20.0 {
            break;
        }
        assert!(Instant::now() < deadline, "command never ran: {health}");
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn test_run_command_without_console() {
    let host = Host::start(World::new());
    let registry = host.registry();
    let reply = registry.call("run_command", json!({"command": "heal"}));
    assert_eq!(reply["error"], "Console not available. Are you in-game?");
}

#[test]
fn test_bad_calls_are_replies() {
    let (_host, registry) = demo();

    let unknown = registry.call("teleport", json!({}));
    assert_eq!(
        unknown,
        json!({"success": false, "error": "Unknown tool 'teleport'"})
    );

    let bad = registry.call("unity_inspect_object", json!({"instanceId": "twelve"}));
    assert_eq!(bad["success"], false);
    assert!(bad["error"].as_str().unwrap().starts_with("Invalid arguments"));
}

#[test]
fn test_search_sweeps_dead_entries() {
    let (host, registry) = demo();
    let camp = find_one(&registry, "Camp");
    assert!(!registry.tools().cache().is_empty());

    host.handle
        .call_blocking(
            move |world: &mut World| {
                let go = world.find_game_object(i32::try_from(camp).unwrap()).unwrap();
                world.destroy(&go);
            },
            Duration::from_secs(5),
        )
        .unwrap();

    registry.call("unity_search_objects", json!({"nameFilter": "no such object"}));
    assert!(registry.tools().cache().resolve(i32::try_from(camp).unwrap()).is_none());
    let cached = registry.tools().cache().len();
    registry.call("unity_search_objects", json!({"nameFilter": "no such object"}));
    assert_eq!(registry.tools().cache().len(), cached);
}
