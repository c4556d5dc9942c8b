//! Components: typed state attached to a game object.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use probe_core::{HostObject, InstanceId, Introspectable};

use crate::GameObject;

/// State type stored in a [`ComponentCell`].
pub trait ComponentState: Introspectable + Clone + Send + Sync + 'static {
    /// Short type name, e.g. `"Rigidbody"`.
    const TYPE_NAME: &'static str;
    /// Fully qualified type name, e.g. `"UnityEngine.Rigidbody"`.
    const FULL_TYPE_NAME: &'static str;
    /// Behaviours carry an enabled flag; plain components do not.
    const IS_BEHAVIOUR: bool = false;
}

/// A component as the rest of the host sees it, with the state type erased.
pub trait Component: HostObject {
    /// Owning game object, if it is still around.
    fn game_object(&self) -> Option<Arc<GameObject>>;

    /// Enabled flag; `None` for components that are not behaviours.
    fn enabled(&self) -> Option<bool>;

    fn set_enabled(&self, enabled: bool);

    fn is_behaviour(&self) -> bool;

    fn into_host_object(self: Arc<Self>) -> Arc<dyn HostObject>;

    /// Copy of this component under a new id and owner.
    fn duplicate(&self, id: InstanceId, owner: Weak<GameObject>) -> Arc<dyn Component>;

    fn mark_destroyed(&self);
}

/// Storage for one component instance.
pub struct ComponentCell<S> {
    id: InstanceId,
    alive: AtomicBool,
    enabled: AtomicBool,
    owner: Weak<GameObject>,
    state: RwLock<S>,
}

impl<S: ComponentState> ComponentCell<S> {
    pub(crate) fn new(id: InstanceId, owner: Weak<GameObject>, state: S) -> Self {
        Self {
            id,
            alive: AtomicBool::new(true),
            enabled: AtomicBool::new(true),
            owner,
            state: RwLock::new(state),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, S> {
        self.state.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, S> {
        self.state.write()
    }
}

impl<S: ComponentState> HostObject for ComponentCell<S> {
    fn instance_id(&self) -> InstanceId {
        self.id
    }

    fn type_name(&self) -> &'static str {
        S::TYPE_NAME
    }

    fn full_type_name(&self) -> &'static str {
        S::FULL_TYPE_NAME
    }

    /// Components share their game object's name.
    fn name(&self) -> String {
        self.owner
            .upgrade()
            .map(|go| go.name())
            .unwrap_or_default()
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    fn inspect(&self, visit: &mut dyn FnMut(&dyn Introspectable)) -> bool {
        visit(&*self.state.read());
        true
    }
}

impl<S: ComponentState> Component for ComponentCell<S> {
    fn game_object(&self) -> Option<Arc<GameObject>> {
        self.owner.upgrade()
    }

    fn enabled(&self) -> Option<bool> {
        S::IS_BEHAVIOUR.then(|| self.enabled.load(Ordering::Acquire))
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    fn is_behaviour(&self) -> bool {
        S::IS_BEHAVIOUR
    }

    fn into_host_object(self: Arc<Self>) -> Arc<dyn HostObject> {
        self
    }

    fn duplicate(&self, id: InstanceId, owner: Weak<GameObject>) -> Arc<dyn Component> {
        let copy = Self::new(id, owner, self.state.read().clone());
        copy.set_enabled(self.enabled.load(Ordering::Acquire));
        Arc::new(copy)
    }

    fn mark_destroyed(&self) {
        self.alive.store(false, Ordering::Release);
    }
}

/// Downcast an erased component to its concrete cell.
pub fn downcast_component<S: ComponentState>(
    component: Arc<dyn Component>,
) -> Option<Arc<ComponentCell<S>>> {
    component.into_any_arc().downcast::<ComponentCell<S>>().ok()
}
