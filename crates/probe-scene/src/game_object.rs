//! Game objects: named hierarchy nodes that carry components.
//!
//! Parents own their children; a child only points back weakly. Components
//! point at their owner weakly as well, so an object graph never holds a
//! strong cycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use probe_core::math::{Quaternion, Vector3};
use probe_core::{HostObject, InstanceId, Introspectable};

use crate::component::downcast_component;
use crate::{Component, ComponentCell, ComponentState, SceneHandle, Transform};

/// Flags every game object carries.
#[derive(Debug, Clone, Introspectable)]
pub struct GameObjectState {
    pub active: bool,
    pub layer: i32,
    pub tag: String,
    pub is_static: bool,
}

impl Default for GameObjectState {
    fn default() -> Self {
        Self {
            active: true,
            layer: 0,
            tag: "Untagged".to_owned(),
            is_static: false,
        }
    }
}

struct Links {
    parent: Weak<GameObject>,
    children: Vec<Arc<GameObject>>,
    /// Transform first, then components in the order they were added.
    components: Vec<Arc<dyn Component>>,
    /// `None` for objects outside every scene (prefab assets).
    scene: Option<SceneHandle>,
}

pub struct GameObject {
    id: InstanceId,
    name: RwLock<String>,
    alive: AtomicBool,
    transform: Arc<ComponentCell<Transform>>,
    state: RwLock<GameObjectState>,
    links: RwLock<Links>,
}

impl std::fmt::Debug for GameObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameObject")
            .field("id", &self.id)
            .field("name", &*self.name.read())
            .field("alive", &self.is_alive())
            .finish_non_exhaustive()
    }
}

impl GameObject {
    pub(crate) fn new(
        id: InstanceId,
        transform_id: InstanceId,
        name: &str,
        scene: Option<SceneHandle>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak| {
            let transform = Arc::new(ComponentCell::new(
                transform_id,
                weak.clone(),
                Transform::default(),
            ));
            let first: Arc<dyn Component> = transform.clone();
            Self {
                id,
                name: RwLock::new(name.to_owned()),
                alive: AtomicBool::new(true),
                transform,
                state: RwLock::new(GameObjectState::default()),
                links: RwLock::new(Links {
                    parent: Weak::new(),
                    children: Vec::new(),
                    components: vec![first],
                    scene,
                }),
            }
        })
    }

    pub fn set_name(&self, name: impl Into<String>) {
        *self.name.write() = name.into();
    }

    pub fn transform(&self) -> &Arc<ComponentCell<Transform>> {
        &self.transform
    }

    pub fn state(&self) -> RwLockReadGuard<'_, GameObjectState> {
        self.state.read()
    }

    pub fn state_mut(&self) -> RwLockWriteGuard<'_, GameObjectState> {
        self.state.write()
    }

    pub fn active_self(&self) -> bool {
        self.state.read().active
    }

    pub fn set_active(&self, active: bool) {
        self.state.write().active = active;
    }

    /// Active and every ancestor active.
    pub fn active_in_hierarchy(&self) -> bool {
        self.active_self() && self.parent().is_none_or(|parent| parent.active_in_hierarchy())
    }

    pub fn parent(&self) -> Option<Arc<GameObject>> {
        self.links.read().parent.upgrade()
    }

    pub fn child_objects(&self) -> Vec<Arc<GameObject>> {
        self.links.read().children.clone()
    }

    pub fn child_count(&self) -> usize {
        self.links.read().children.len()
    }

    pub fn child(&self, index: usize) -> Option<Arc<GameObject>> {
        self.links.read().children.get(index).cloned()
    }

    pub fn components(&self) -> Vec<Arc<dyn Component>> {
        self.links.read().components.clone()
    }

    pub fn get_component<S: ComponentState>(&self) -> Option<Arc<ComponentCell<S>>> {
        self.components()
            .into_iter()
            .find_map(downcast_component::<S>)
    }

    /// First component whose short or full type name matches, ignoring case.
    pub fn find_component(&self, type_name: &str) -> Option<Arc<dyn Component>> {
        self.links
            .read()
            .components
            .iter()
            .find(|c| {
                c.type_name().eq_ignore_ascii_case(type_name)
                    || c.full_type_name().eq_ignore_ascii_case(type_name)
            })
            .cloned()
    }

    pub fn scene(&self) -> Option<SceneHandle> {
        self.links.read().scene
    }

    /// Slash-separated names from the root down, e.g. `Player/Visual/Lantern`.
    pub fn path(&self) -> String {
        let mut segments = vec![self.name()];
        let mut cursor = self.parent();
        while let Some(parent) = cursor {
            segments.push(parent.name());
            cursor = parent.parent();
        }
        segments.reverse();
        segments.join("/")
    }

    pub fn local_position(&self) -> Vector3 {
        self.transform.read().local_position
    }

    pub fn set_local_position(&self, position: Vector3) {
        self.transform.write().local_position = position;
    }

    /// World-space position.
    pub fn position(&self) -> Vector3 {
        let local = self.local_position();
        match self.parent() {
            Some(parent) => {
                parent.position() + parent.rotation().rotate(local.scale(parent.lossy_scale()))
            }
            None => local,
        }
    }

    /// World-space rotation.
    pub fn rotation(&self) -> Quaternion {
        let local = self.transform.read().local_rotation;
        match self.parent() {
            Some(parent) => parent.rotation() * local,
            None => local,
        }
    }

    /// World-space scale, ignoring rotation skew.
    pub fn lossy_scale(&self) -> Vector3 {
        let local = self.transform.read().local_scale;
        match self.parent() {
            Some(parent) => parent.lossy_scale().scale(local),
            None => local,
        }
    }

    /// This object and everything below it, depth first, self first.
    pub fn descendants(self: &Arc<Self>) -> Vec<Arc<GameObject>> {
        let mut out = Vec::new();
        let mut stack = vec![Arc::clone(self)];
        while let Some(node) = stack.pop() {
            let children = node.child_objects();
            out.push(node);
            stack.extend(children.into_iter().rev());
        }
        out
    }

    pub(crate) fn attach_child(self: &Arc<Self>, child: &Arc<GameObject>) {
        child.links.write().parent = Arc::downgrade(self);
        child.set_scene_recursive(self.scene());
        self.links.write().children.push(Arc::clone(child));
    }

    pub(crate) fn detach_child(&self, id: InstanceId) -> Option<Arc<GameObject>> {
        let mut links = self.links.write();
        let index = links.children.iter().position(|c| c.id == id)?;
        let child = links.children.remove(index);
        drop(links);
        child.links.write().parent = Weak::new();
        Some(child)
    }

    pub(crate) fn set_scene_recursive(&self, scene: Option<SceneHandle>) {
        let children = {
            let mut links = self.links.write();
            links.scene = scene;
            links.children.clone()
        };
        for child in children {
            child.set_scene_recursive(scene);
        }
    }

    pub(crate) fn push_component(&self, component: Arc<dyn Component>) {
        self.links.write().components.push(component);
    }

    /// Mark this object, its components and its descendants destroyed.
    ///
    /// Every id released on the way is pushed onto `freed`.
    pub(crate) fn mark_destroyed(&self, freed: &mut Vec<InstanceId>) {
        if !self.alive.swap(false, Ordering::AcqRel) {
            return;
        }
        freed.push(self.id);

        let (components, children) = {
            let links = self.links.read();
            (links.components.clone(), links.children.clone())
        };
        for component in components {
            component.mark_destroyed();
            freed.push(component.instance_id());
        }
        for child in children {
            child.mark_destroyed(freed);
        }
    }
}

impl HostObject for GameObject {
    fn instance_id(&self) -> InstanceId {
        self.id
    }

    fn type_name(&self) -> &'static str {
        "GameObject"
    }

    fn full_type_name(&self) -> &'static str {
        "UnityEngine.GameObject"
    }

    fn name(&self) -> String {
        self.name.read().clone()
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    fn inspect(&self, visit: &mut dyn FnMut(&dyn Introspectable)) -> bool {
        visit(&*self.state.read());
        true
    }

    fn children(&self) -> Vec<Arc<dyn HostObject>> {
        self.child_objects()
            .into_iter()
            .map(|child| child as Arc<dyn HostObject>)
            .collect()
    }
}
