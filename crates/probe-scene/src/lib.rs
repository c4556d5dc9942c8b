//! In-process scene graph host.
//!
//! A single-threaded world of scenes, game objects and components that the
//! introspection bridge inspects. Every object is a
//! [`HostObject`](probe_core::HostObject) with an instance id from a
//! recycling allocator; destroying an object marks it, its components and
//! its descendants dead and frees their ids.

#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

mod component;
mod components;
mod console;
mod demo;
mod error;
mod game_object;
mod id;
mod scene;
mod world;

pub use component::{Component, ComponentCell, ComponentState, downcast_component};
pub use components::{
    Character, Console, Faction, Light, LightType, MainThreadDispatcher, Player, Rigidbody,
    Transform, ZNetScene,
};
pub use demo::demo_world;
pub use error::SceneError;
pub use game_object::{GameObject, GameObjectState};
pub use id::InstanceIdAllocator;
pub use scene::{
    ChildFilter, DONT_DESTROY_ON_LOAD, HIDE_AND_DONT_SAVE, Scene, SceneFilter, SceneHandle,
    SceneKind, layer_name,
};
pub use world::{ObjectQuery, SceneObject, Singleton, World};
