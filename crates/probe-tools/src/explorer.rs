//! Scene explorer tools: object search, singletons, scenes, inspection.

use probe_core::{BridgeError, HostObject};
use probe_scene::{
    ChildFilter, HIDE_AND_DONT_SAVE, ObjectQuery, SceneError, SceneFilter, SceneHandle, SceneKind,
};
use serde::Serialize;
use serde_json::{Value as Json, json};

use crate::tools::success;
use crate::view::Resolved;
use crate::{
    BridgeTools, GetChildrenArgs, InspectObjectArgs, NoArgs, ReadComponentArgs, SceneRootsArgs,
    SearchObjectsArgs, SearchSingletonsArgs, ToolError,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Matches {
    count: usize,
    returned_count: usize,
    results: Vec<Json>,
}

impl BridgeTools {
    /// Objects by name and type, across scenes and prefab assets.
    pub fn search_objects(&self, args: SearchObjectsArgs) -> Json {
        self.on_host("unity_search_objects", move |world, view| {
            let query = ObjectQuery {
                name: args.name_filter.filter(|name| !name.is_empty()),
                type_name: args.type_filter.filter(|name| !name.is_empty()),
                scene: args.scene_filter.parse::<SceneFilter>()?,
                child: args.child_filter.parse::<ChildFilter>()?,
            };
            let found = world.search(&query);
            let results: Vec<Json> = found
                .iter()
                .take(args.max_results)
                .map(|obj| view.scene_object(obj))
                .collect();
            view.sweep();
            success(Matches {
                count: found.len(),
                returned_count: results.len(),
                results,
            })
        })
    }

    /// Registered singletons whose type name contains the filter.
    pub fn search_singletons(&self, args: SearchSingletonsArgs) -> Json {
        self.on_host("unity_search_singletons", move |world, view| {
            let found = world.search_singletons(args.type_filter.as_deref().unwrap_or_default());
            let results: Vec<Json> = found
                .iter()
                .take(args.max_results)
                .map(|singleton| view.singleton(singleton))
                .collect();
            view.sweep();
            success(Matches {
                count: found.len(),
                returned_count: results.len(),
                results,
            })
        })
    }

    /// Loaded scenes followed by the two pseudo-scenes.
    pub fn get_loaded_scenes(&self, _args: NoArgs) -> Json {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct SceneInfo {
            name: String,
            path: String,
            build_index: i32,
            is_loaded: bool,
            root_count: usize,
            handle: SceneHandle,
            scene_type: SceneKind,
        }

        self.on_host("unity_get_loaded_scenes", |world, _| {
            let scenes: Vec<SceneInfo> = world
                .scenes()
                .map(|scene| SceneInfo {
                    name: scene.name().to_owned(),
                    path: scene.path().to_owned(),
                    build_index: scene.build_index(),
                    is_loaded: scene.is_loaded(),
                    root_count: if scene.is_valid() { scene.root_count() } else { 0 },
                    handle: scene.handle(),
                    scene_type: scene.kind(),
                })
                .collect();
            success(json!({
                "count": scenes.len(),
                "scenes": scenes,
            }))
        })
    }

    /// Root objects of a scene; the active scene when no handle is given.
    ///
    /// The HideAndDontSave handle lists objects that live outside every
    /// scene, prefab assets included.
    pub fn get_scene_roots(&self, args: SceneRootsArgs) -> Json {
        self.on_host("unity_get_scene_roots", move |world, view| {
            let roots = match args.scene_handle {
                None => world
                    .active_scene()
                    .ok_or(SceneError::NoActiveScene)?
                    .roots()
                    .to_vec(),
                Some(HIDE_AND_DONT_SAVE) => {
                    let mut roots = world
                        .scene(HIDE_AND_DONT_SAVE)
                        .map(|scene| scene.roots().to_vec())
                        .unwrap_or_default();
                    roots.extend(world.prefabs());
                    roots
                }
                Some(handle) => world
                    .scene(handle)
                    .ok_or(SceneError::SceneNotFound(handle))?
                    .roots()
                    .to_vec(),
            };
            let roots: Vec<Json> = roots
                .iter()
                .take(args.max_results)
                .map(|go| Json::Object(view.game_object(go, false)))
                .collect();
            view.sweep();
            success(json!({
                "count": roots.len(),
                "roots": roots,
            }))
        })
    }

    /// Everything known about one object: transform and children for game
    /// objects, members for components and other objects.
    pub fn inspect_object(&self, args: InspectObjectArgs) -> Json {
        self.on_host("unity_inspect_object", move |world, view| {
            let id = args.instance_id;
            let data = match view.resolve(world, id) {
                Some(Resolved::GameObject(go)) => view.game_object_detail(&go),
                Some(Resolved::Component(component)) => {
                    view.component(&component, args.include_members)
                }
                Some(Resolved::Other(obj)) => view.object(&obj, args.include_members),
                None => return Err(BridgeError::NotFound(id).into()),
            };
            success(json!({ "data": data }))
        })
    }

    /// One component of a game object, matched by short or full type name.
    pub fn read_component(&self, args: ReadComponentArgs) -> Json {
        self.on_host("unity_read_component", move |world, view| {
            let id = args.game_object_instance_id;
            let go = view
                .resolve_game_object(world, id)
                .ok_or(ToolError::GameObjectNotFound(id))?;

            let Some(component) = go.find_component(&args.component_type) else {
                let mut available: Vec<String> = Vec::new();
                for component in go.components() {
                    let name = component.type_name().to_owned();
                    if !available.contains(&name) {
                        available.push(name);
                    }
                }
                return Err(ToolError::ComponentNotFound {
                    component: args.component_type,
                    available,
                });
            };

            let data = view.component(&component, args.include_members);
            success(json!({ "data": data }))
        })
    }

    /// Direct children of a game object, in sibling order.
    pub fn get_children(&self, args: GetChildrenArgs) -> Json {
        self.on_host("unity_get_children", move |world, view| {
            let id = args.parent_instance_id;
            let parent = view
                .resolve_game_object(world, id)
                .ok_or(ToolError::GameObjectNotFound(id))?;

            let children = parent.child_objects();
            let listed: Vec<Json> = children
                .iter()
                .take(args.max_results)
                .map(|child| Json::Object(view.game_object(child, args.include_components)))
                .collect();
            view.sweep();
            success(json!({
                "parentName": parent.name(),
                "totalChildren": children.len(),
                "returnedCount": listed.len(),
                "children": listed,
            }))
        })
    }
}
