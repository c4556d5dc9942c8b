//! The host world: scenes, prefabs, singletons and the local player.
//!
//! `World` is owned by the host loop. Everything that mutates it runs on
//! that thread, usually as an action drained from the main-loop dispatcher.

use std::sync::{Arc, Weak};

use probe_core::math::Vector3;
use probe_core::{HostObject, InstanceId};
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use crate::scene::{DONT_DESTROY_ON_LOAD, HIDE_AND_DONT_SAVE, Scene};
use crate::{
    ChildFilter, Component, ComponentCell, ComponentState, Console, GameObject,
    InstanceIdAllocator, Rigidbody, SceneError, SceneFilter, SceneHandle, ZNetScene,
};

const OBJECT_BASES: [&str; 2] = ["Object", "UnityEngine.Object"];
const GAME_OBJECT_TYPES: [&str; 2] = ["GameObject", "UnityEngine.GameObject"];
const COMPONENT_BASES: [&str; 2] = ["Component", "UnityEngine.Component"];
const BEHAVIOUR_BASES: [&str; 4] = [
    "Behaviour",
    "UnityEngine.Behaviour",
    "MonoBehaviour",
    "UnityEngine.MonoBehaviour",
];

/// A globally reachable instance.
#[derive(Debug, Clone)]
pub enum Singleton {
    /// A host-managed object.
    Object(Arc<dyn HostObject>),
    /// A plain managed instance the identity cache cannot track.
    Plain {
        full_type_name: &'static str,
        hash_code: i32,
    },
}

impl Singleton {
    pub fn full_type_name(&self) -> &'static str {
        match self {
            Self::Object(obj) => obj.full_type_name(),
            Self::Plain { full_type_name, .. } => full_type_name,
        }
    }

    /// Last dotted segment of the full type name.
    pub fn type_name(&self) -> &'static str {
        let full = self.full_type_name();
        full.rsplit('.').next().unwrap_or(full)
    }
}

/// A game object or one of its components.
#[derive(Clone)]
pub enum SceneObject {
    GameObject(Arc<GameObject>),
    Component(Arc<dyn Component>),
}

impl SceneObject {
    pub fn instance_id(&self) -> InstanceId {
        match self {
            Self::GameObject(go) => go.instance_id(),
            Self::Component(component) => component.instance_id(),
        }
    }

    pub fn into_host_object(self) -> Arc<dyn HostObject> {
        match self {
            Self::GameObject(go) => go,
            Self::Component(component) => component.into_host_object(),
        }
    }
}

/// Object search criteria. Empty filters match everything.
#[derive(Debug, Clone, Default)]
pub struct ObjectQuery {
    /// Case-insensitive substring of the object name.
    pub name: Option<String>,
    /// Short or full type name, or a base type such as `Component`.
    pub type_name: Option<String>,
    pub scene: SceneFilter,
    pub child: ChildFilter,
}

pub struct World {
    ids: InstanceIdAllocator,
    /// Every component by id, transforms included.
    components: FxHashMap<InstanceId, Weak<dyn Component>>,
    scenes: Vec<Scene>,
    dont_destroy: Scene,
    hidden: Scene,
    active_scene: Option<SceneHandle>,
    next_scene_handle: SceneHandle,
    singletons: Vec<Singleton>,
    znet_scene: Weak<ComponentCell<ZNetScene>>,
    console: Weak<ComponentCell<Console>>,
    local_player: Weak<GameObject>,
    time: f64,
    frame: u64,
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("scenes", &self.scenes.len())
            .field("objects", &self.ids.alive_count())
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ids: InstanceIdAllocator::new(),
            components: FxHashMap::default(),
            scenes: Vec::new(),
            dont_destroy: Scene::new(DONT_DESTROY_ON_LOAD, "DontDestroyOnLoad", "", -1),
            hidden: Scene::new(HIDE_AND_DONT_SAVE, "HideAndDontSave", "", -1),
            active_scene: None,
            next_scene_handle: 1,
            singletons: Vec::new(),
            znet_scene: Weak::new(),
            console: Weak::new(),
            local_player: Weak::new(),
            time: 0.0,
            frame: 0,
        }
    }

    // ------------------------------------------------------------------
    // Scenes
    // ------------------------------------------------------------------

    /// Load an empty scene. The first scene loaded becomes the active one.
    pub fn load_scene(&mut self, name: &str, path: &str, build_index: i32) -> SceneHandle {
        let handle = self.next_scene_handle;
        self.next_scene_handle += 1;
        self.scenes.push(Scene::new(handle, name, path, build_index));
        if self.active_scene.is_none() {
            self.active_scene = Some(handle);
        }
        info!(handle, name, "loaded scene");
        handle
    }

    /// Every loaded scene, then the DontDestroyOnLoad and hidden pseudo-scenes.
    pub fn scenes(&self) -> impl Iterator<Item = &Scene> {
        self.scenes
            .iter()
            .chain([&self.dont_destroy, &self.hidden])
    }

    pub fn scene(&self, handle: SceneHandle) -> Option<&Scene> {
        self.scenes().find(|scene| scene.handle() == handle)
    }

    fn scene_mut(&mut self, handle: SceneHandle) -> Option<&mut Scene> {
        match handle {
            DONT_DESTROY_ON_LOAD => Some(&mut self.dont_destroy),
            HIDE_AND_DONT_SAVE => Some(&mut self.hidden),
            _ => self.scenes.iter_mut().find(|scene| scene.handle() == handle),
        }
    }

    pub fn active_scene(&self) -> Option<&Scene> {
        self.active_scene.and_then(|handle| self.scene(handle))
    }

    /// Only regular scenes can be active.
    pub fn set_active_scene(&mut self, handle: SceneHandle) -> Result<(), SceneError> {
        if !self.scenes.iter().any(|scene| scene.handle() == handle) {
            return Err(SceneError::SceneNotFound(handle));
        }
        self.active_scene = Some(handle);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Objects
    // ------------------------------------------------------------------

    fn new_object(&mut self, name: &str, scene: Option<SceneHandle>) -> Arc<GameObject> {
        let id = self.ids.allocate();
        let transform_id = self.ids.allocate();
        let go = GameObject::new(id, transform_id, name, scene);
        let transform: Arc<dyn Component> = go.transform().clone();
        self.index_component(&transform);
        go
    }

    fn index_component(&mut self, component: &Arc<dyn Component>) {
        self.components
            .insert(component.instance_id(), Arc::downgrade(component));
    }

    /// Spawn a root object in `scene`.
    pub fn spawn(&mut self, name: &str, scene: SceneHandle) -> Result<Arc<GameObject>, SceneError> {
        if self.scene(scene).is_none() {
            return Err(SceneError::SceneNotFound(scene));
        }
        let go = self.new_object(name, Some(scene));
        if let Some(target) = self.scene_mut(scene) {
            target.roots.push(Arc::clone(&go));
        }
        debug!(id = go.instance_id(), name, scene, "spawned game object");
        Ok(go)
    }

    /// Spawn a root object in the active scene.
    pub fn spawn_in_active(&mut self, name: &str) -> Result<Arc<GameObject>, SceneError> {
        let scene = self.active_scene.ok_or(SceneError::NoActiveScene)?;
        self.spawn(name, scene)
    }

    pub fn spawn_child(
        &mut self,
        parent: &Arc<GameObject>,
        name: &str,
    ) -> Result<Arc<GameObject>, SceneError> {
        if !parent.is_alive() {
            return Err(SceneError::Destroyed(parent.instance_id()));
        }
        let go = self.new_object(name, parent.scene());
        parent.attach_child(&go);
        Ok(go)
    }

    /// Attach a new component. A component added to a destroyed object is
    /// born destroyed.
    pub fn add_component<S: ComponentState>(
        &mut self,
        go: &Arc<GameObject>,
        state: S,
    ) -> Arc<ComponentCell<S>> {
        let id = self.ids.allocate();
        let cell = Arc::new(ComponentCell::new(id, Arc::downgrade(go), state));
        if go.is_alive() {
            let erased: Arc<dyn Component> = cell.clone();
            self.index_component(&erased);
            go.push_component(erased);
        } else {
            cell.mark_destroyed();
            self.ids.deallocate(id);
        }
        cell
    }

    /// Move a root object into the DontDestroyOnLoad pseudo-scene.
    pub fn dont_destroy_on_load(&mut self, go: &Arc<GameObject>) -> Result<(), SceneError> {
        if go.parent().is_some() {
            return Err(SceneError::NotRoot);
        }
        if let Some(scene) = go.scene().and_then(|handle| self.scene_mut(handle)) {
            scene.roots.retain(|root| !Arc::ptr_eq(root, go));
        }
        go.set_scene_recursive(Some(DONT_DESTROY_ON_LOAD));
        self.dont_destroy.roots.push(Arc::clone(go));
        Ok(())
    }

    /// Destroy an object with its components and descendants.
    ///
    /// Their ids go back to the allocator and may be handed out again.
    /// Returns the number of ids released.
    pub fn destroy(&mut self, go: &Arc<GameObject>) -> usize {
        if !go.is_alive() {
            return 0;
        }

        if let Some(parent) = go.parent() {
            parent.detach_child(go.instance_id());
        } else if let Some(handle) = go.scene() {
            if let Some(scene) = self.scene_mut(handle) {
                scene.roots.retain(|root| !Arc::ptr_eq(root, go));
            }
        } else if let Some(registry) = self.znet_scene() {
            registry.write().prefabs.retain(|prefab| !Arc::ptr_eq(prefab, go));
        }

        let mut freed = Vec::new();
        go.mark_destroyed(&mut freed);
        for id in &freed {
            self.ids.deallocate(*id);
            self.components.remove(id);
        }
        debug!(id = go.instance_id(), released = freed.len(), "destroyed game object");
        freed.len()
    }

    /// Every live game object: scene trees first, then prefab assets.
    pub fn game_objects(&self) -> Vec<Arc<GameObject>> {
        let mut out = Vec::new();
        for scene in self.scenes() {
            for root in scene.roots() {
                out.extend(root.descendants());
            }
        }
        for prefab in self.prefabs() {
            out.extend(prefab.descendants());
        }
        out
    }

    /// Live component by id.
    pub fn component(&self, id: InstanceId) -> Option<Arc<dyn Component>> {
        self.components
            .get(&id)?
            .upgrade()
            .filter(|component| component.is_alive() && component.instance_id() == id)
    }

    /// Full scan of every live object for `id`.
    pub fn find_object(&self, id: InstanceId) -> Option<SceneObject> {
        for go in self.game_objects() {
            if go.instance_id() == id {
                return Some(SceneObject::GameObject(go));
            }
            if let Some(component) = go
                .components()
                .into_iter()
                .find(|component| component.instance_id() == id)
            {
                return Some(SceneObject::Component(component));
            }
        }
        None
    }

    pub fn find_game_object(&self, id: InstanceId) -> Option<Arc<GameObject>> {
        self.game_objects()
            .into_iter()
            .find(|go| go.instance_id() == id)
    }

    /// Objects matching `query`: game objects and their components.
    pub fn search(&self, query: &ObjectQuery) -> Vec<SceneObject> {
        let name = query
            .name
            .as_deref()
            .map(str::to_lowercase)
            .filter(|n| !n.is_empty());
        let type_filter = query
            .type_name
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());

        let mut out = Vec::new();
        for go in self.game_objects() {
            if !query.scene.accepts(go.scene()) || !query.child.accepts(go.parent().is_some()) {
                continue;
            }
            if let Some(name) = &name {
                if !go.name().to_lowercase().contains(name.as_str()) {
                    continue;
                }
            }

            let components = go.components();
            if type_filter.is_none_or(game_object_matches) {
                out.push(SceneObject::GameObject(go));
            }
            for component in components {
                if type_filter.is_none_or(|filter| component_matches(&*component, filter)) {
                    out.push(SceneObject::Component(component));
                }
            }
        }
        out
    }

    // ------------------------------------------------------------------
    // Singletons, prefabs, player
    // ------------------------------------------------------------------

    pub fn register_singleton(&mut self, singleton: Singleton) {
        self.singletons.push(singleton);
    }

    pub fn singletons(&self) -> &[Singleton] {
        &self.singletons
    }

    /// Singletons whose full type name contains `filter`, ignoring case.
    /// Destroyed object singletons are skipped.
    pub fn search_singletons(&self, filter: &str) -> Vec<&Singleton> {
        let filter = filter.to_lowercase();
        self.singletons
            .iter()
            .filter(|s| match s {
                Singleton::Object(obj) => obj.is_alive(),
                Singleton::Plain { .. } => true,
            })
            .filter(|s| s.full_type_name().to_lowercase().contains(&filter))
            .collect()
    }

    pub fn set_local_player(&mut self, go: &Arc<GameObject>) {
        self.local_player = Arc::downgrade(go);
    }

    pub fn local_player(&self) -> Option<Arc<GameObject>> {
        self.local_player.upgrade().filter(|player| player.is_alive())
    }

    /// Attach the prefab registry to `host` and publish it as a singleton.
    pub fn install_znet_scene(&mut self, host: &Arc<GameObject>) -> Arc<ComponentCell<ZNetScene>> {
        let cell = self.add_component(host, ZNetScene::default());
        self.znet_scene = Arc::downgrade(&cell);
        self.register_singleton(Singleton::Object(cell.clone()));
        cell
    }

    pub fn znet_scene(&self) -> Option<Arc<ComponentCell<ZNetScene>>> {
        self.znet_scene.upgrade().filter(|cell| cell.is_alive())
    }

    /// Attach the console to `host` and publish it as a singleton.
    pub fn install_console(&mut self, host: &Arc<GameObject>) -> Arc<ComponentCell<Console>> {
        let cell = self.add_component(host, Console::default());
        self.console = Arc::downgrade(&cell);
        self.register_singleton(Singleton::Object(cell.clone()));
        cell
    }

    pub fn console(&self) -> Option<Arc<ComponentCell<Console>>> {
        self.console.upgrade().filter(|cell| cell.is_alive())
    }

    /// Prefab assets registered with the prefab registry.
    pub fn prefabs(&self) -> Vec<Arc<GameObject>> {
        self.znet_scene()
            .map(|registry| registry.read().prefabs.clone())
            .unwrap_or_default()
    }

    /// Create a prefab asset outside every scene and register it.
    pub fn add_prefab(&mut self, name: &str) -> Result<Arc<GameObject>, SceneError> {
        let registry = self
            .znet_scene()
            .ok_or(SceneError::NotAvailable("ZNetScene"))?;
        let prefab = self.new_object(name, None);
        registry.write().prefabs.push(Arc::clone(&prefab));
        Ok(prefab)
    }

    /// Copy `prefab` and its subtree into the active scene at `position`.
    pub fn instantiate(
        &mut self,
        prefab: &Arc<GameObject>,
        position: Vector3,
    ) -> Result<Arc<GameObject>, SceneError> {
        let scene = self.active_scene.ok_or(SceneError::NoActiveScene)?;
        if !prefab.is_alive() {
            return Err(SceneError::Destroyed(prefab.instance_id()));
        }

        let name = format!("{}(Clone)", prefab.name());
        let copy = self.clone_tree(prefab, Some(scene), &name);
        copy.set_local_position(position);
        if let Some(target) = self.scene_mut(scene) {
            target.roots.push(Arc::clone(&copy));
        }
        debug!(id = copy.instance_id(), prefab = %prefab.name(), "instantiated prefab");
        Ok(copy)
    }

    fn clone_tree(
        &mut self,
        source: &Arc<GameObject>,
        scene: Option<SceneHandle>,
        name: &str,
    ) -> Arc<GameObject> {
        let copy = self.new_object(name, scene);
        *copy.state_mut() = source.state().clone();
        *copy.transform().write() = source.transform().read().clone();

        // The transform is always first and already exists on the copy.
        for component in source.components().into_iter().skip(1) {
            let id = self.ids.allocate();
            let duplicate = component.duplicate(id, Arc::downgrade(&copy));
            self.index_component(&duplicate);
            copy.push_component(duplicate);
        }
        for child in source.child_objects() {
            let child_copy = self.clone_tree(&child, scene, &child.name());
            copy.attach_child(&child_copy);
        }
        copy
    }

    // ------------------------------------------------------------------
    // Simulation
    // ------------------------------------------------------------------

    /// Advance one frame: moves non-kinematic rigidbodies by their velocity.
    pub fn update(&mut self, dt: f32) {
        self.time += f64::from(dt);
        self.frame += 1;

        for go in self.game_objects() {
            if go.scene().is_none() || !go.active_in_hierarchy() {
                continue;
            }
            let Some(body) = go.get_component::<Rigidbody>() else {
                continue;
            };
            let velocity = {
                let body = body.read();
                if body.is_kinematic {
                    continue;
                }
                body.velocity
            };
            if velocity != Vector3::ZERO {
                go.set_local_position(go.local_position() + velocity * dt);
            }
        }
    }

    /// Seconds simulated so far.
    pub const fn time(&self) -> f64 {
        self.time
    }

    pub const fn frame(&self) -> u64 {
        self.frame
    }

    pub const fn ids(&self) -> &InstanceIdAllocator {
        &self.ids
    }
}

fn eq_any(names: &[&str], filter: &str) -> bool {
    names.iter().any(|name| name.eq_ignore_ascii_case(filter))
}

fn game_object_matches(filter: &str) -> bool {
    eq_any(&GAME_OBJECT_TYPES, filter) || eq_any(&OBJECT_BASES, filter)
}

fn component_matches(component: &dyn Component, filter: &str) -> bool {
    component.type_name().eq_ignore_ascii_case(filter)
        || component.full_type_name().eq_ignore_ascii_case(filter)
        || eq_any(&COMPONENT_BASES, filter)
        || eq_any(&OBJECT_BASES, filter)
        || (component.is_behaviour() && eq_any(&BEHAVIOUR_BASES, filter))
}
