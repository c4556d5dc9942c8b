//! JSON views of scene objects, built on the host thread.

use std::sync::Arc;

use probe_core::math::Vector3;
use probe_core::{
    BridgeConfig, HostObject, IdentityCache, InstanceId, ToValue, ValueSerializer, downcast_object,
};
use probe_scene::{Component, GameObject, SceneObject, Singleton, World, layer_name};
use serde_json::{Map, Value as Json, json};

/// Children listed inline by an object inspection.
const INSPECT_CHILD_LIMIT: usize = 20;

/// An object looked up by id, sorted by what the tools can say about it.
pub enum Resolved {
    GameObject(Arc<GameObject>),
    Component(Arc<dyn Component>),
    Other(Arc<dyn HostObject>),
}

/// Serializer plus the depth member dumps run at.
///
/// Cheap to clone; each tool call moves a clone onto the host thread.
#[derive(Debug, Clone)]
pub struct HostView {
    serializer: ValueSerializer,
    max_depth: i32,
}

impl HostView {
    #[must_use]
    pub fn new(cache: Arc<IdentityCache>, config: &BridgeConfig) -> Self {
        Self {
            serializer: ValueSerializer::new(cache, config),
            max_depth: config.default_max_depth,
        }
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<IdentityCache> {
        self.serializer.cache()
    }

    /// Drop cache entries whose objects are gone.
    pub fn sweep(&self) {
        self.cache().sweep();
    }

    /// Find a live object: identity cache first, then a scan of the world.
    ///
    /// A hit from the scan is cached for later calls.
    pub fn resolve(&self, world: &World, id: InstanceId) -> Option<Resolved> {
        if let Some(obj) = self.cache().resolve(id) {
            return Some(classify(world, obj));
        }
        let found = world.find_object(id)?;
        Some(match found {
            SceneObject::GameObject(go) => {
                self.cache().register_typed(&go);
                Resolved::GameObject(go)
            }
            SceneObject::Component(component) => {
                self.cache().register(&Arc::clone(&component).into_host_object());
                Resolved::Component(component)
            }
        })
    }

    /// Like [`resolve`](Self::resolve), restricted to game objects.
    pub fn resolve_game_object(&self, world: &World, id: InstanceId) -> Option<Arc<GameObject>> {
        if let Some(go) = self.cache().resolve_as::<GameObject>(id) {
            return Some(go);
        }
        let go = world.find_game_object(id)?;
        self.cache().register_typed(&go);
        Some(go)
    }

    /// Summary of a game object. Registers it in the cache.
    pub fn game_object(&self, go: &Arc<GameObject>, include_components: bool) -> Map<String, Json> {
        let id = self.cache().register_typed(go);
        let state = go.state().clone();

        let mut out = Map::new();
        out.insert("instanceId".to_owned(), json!(id));
        out.insert("name".to_owned(), json!(go.name()));
        out.insert("path".to_owned(), json!(go.path()));
        out.insert("active".to_owned(), json!(state.active));
        out.insert("activeInHierarchy".to_owned(), json!(go.active_in_hierarchy()));
        out.insert("layer".to_owned(), json!(layer_name(state.layer)));
        out.insert("tag".to_owned(), json!(state.tag));
        out.insert("isStatic".to_owned(), json!(state.is_static));
        if include_components {
            out.insert("components".to_owned(), component_list(go));
        }
        out.insert("childCount".to_owned(), json!(go.child_count()));
        out
    }

    /// Game object summary plus world/local transform and the first children.
    pub fn game_object_detail(&self, go: &Arc<GameObject>) -> Map<String, Json> {
        let mut out = self.game_object(go, true);

        let local_scale = go.transform().read().local_scale;
        out.insert(
            "transform".to_owned(),
            json!({
                "position": self.vector(go.position()),
                "localPosition": self.vector(go.local_position()),
                "rotation": self.vector(go.rotation().euler_angles()),
                "localScale": self.vector(local_scale),
            }),
        );

        let children = go.child_objects();
        let listed: Vec<Json> = children
            .iter()
            .take(INSPECT_CHILD_LIMIT)
            .enumerate()
            .map(|(index, child)| {
                json!({
                    "instanceId": self.cache().register_typed(child),
                    "name": child.name(),
                    "active": child.active_self(),
                    "siblingIndex": index,
                })
            })
            .collect();
        out.insert("children".to_owned(), Json::Array(listed));
        out.insert("totalChildren".to_owned(), json!(children.len()));
        out
    }

    /// Component header, and its members when asked. Registers it in the
    /// cache.
    pub fn component(&self, component: &Arc<dyn Component>, include_members: bool) -> Map<String, Json> {
        let obj = Arc::clone(component).into_host_object();
        let id = self.cache().register(&obj);

        let mut out = Map::new();
        out.insert("instanceId".to_owned(), json!(id));
        out.insert("type".to_owned(), json!(component.full_type_name()));
        out.insert("typeName".to_owned(), json!(component.type_name()));
        if let Some(go) = component.game_object() {
            out.insert("gameObjectName".to_owned(), json!(go.name()));
            out.insert("gameObjectInstanceId".to_owned(), json!(go.instance_id()));
        }
        if let Some(enabled) = component.enabled() {
            out.insert("enabled".to_owned(), json!(enabled));
        }
        if include_members {
            out.insert("members".to_owned(), self.members(&*obj));
        }
        out
    }

    /// Header of any other host object.
    pub fn object(&self, obj: &Arc<dyn HostObject>, include_members: bool) -> Map<String, Json> {
        let id = self.cache().register(obj);

        let mut out = Map::new();
        out.insert("instanceId".to_owned(), json!(id));
        out.insert("type".to_owned(), json!(obj.full_type_name()));
        out.insert("typeName".to_owned(), json!(obj.type_name()));
        out.insert("name".to_owned(), json!(obj.name()));
        if include_members {
            out.insert("members".to_owned(), self.members(&**obj));
        }
        out
    }

    pub fn scene_object(&self, found: &SceneObject) -> Json {
        match found {
            SceneObject::GameObject(go) => Json::Object(self.game_object(go, false)),
            SceneObject::Component(component) => Json::Object(self.component(component, false)),
        }
    }

    pub fn singleton(&self, singleton: &Singleton) -> Json {
        match singleton {
            Singleton::Object(obj) => json!({
                "instanceId": self.cache().register(obj),
                "type": obj.full_type_name(),
                "typeName": obj.type_name(),
                "name": obj.name(),
                "isUnityObject": true,
            }),
            Singleton::Plain { hash_code, .. } => json!({
                "type": singleton.full_type_name(),
                "typeName": singleton.type_name(),
                "isUnityObject": false,
                "hashCode": hash_code,
            }),
        }
    }

    /// `{x, y, z}`, with non-finite axes spelled out as strings.
    pub fn vector(&self, v: Vector3) -> Json {
        self.serializer.serialize(&v.to_value(), 0)
    }

    /// Member dump at the configured depth; `{}` for objects without one.
    fn members(&self, obj: &dyn HostObject) -> Json {
        self.serializer
            .dump_object(obj, self.max_depth)
            .unwrap_or_else(|| Json::Object(Map::new()))
    }
}

/// `{instanceId, type, typeName, enabled}` for every component, transform
/// first. `enabled` is `null` for non-behaviours.
pub fn component_list(go: &GameObject) -> Json {
    Json::Array(
        go.components()
            .iter()
            .map(|component| {
                json!({
                    "instanceId": component.instance_id(),
                    "type": component.full_type_name(),
                    "typeName": component.type_name(),
                    "enabled": component.enabled(),
                })
            })
            .collect(),
    )
}

fn classify(world: &World, obj: Arc<dyn HostObject>) -> Resolved {
    let id = obj.instance_id();
    match downcast_object::<GameObject>(Arc::clone(&obj)) {
        Some(go) => Resolved::GameObject(go),
        None => match world.component(id) {
            Some(component) => Resolved::Component(component),
            None => Resolved::Other(obj),
        },
    }
}
