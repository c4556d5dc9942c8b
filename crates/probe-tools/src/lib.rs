//! JSON tools over a live [`World`](probe_scene::World).
//!
//! Every tool returns a JSON object carrying `success`. On success the rest
//! of the object is the tool's data; on failure it carries `error` (and, for
//! a component miss, `availableComponents`). Nothing is ever returned as a
//! Rust error to the caller.
//!
//! World access always happens on the host tick: [`BridgeTools`] ships a
//! closure through the dispatcher and blocks the calling thread until the
//! host answers or the configured timeout passes.

#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

mod args;
mod error;
mod explorer;
mod player;
mod prefabs;
mod registry;
mod terminal;
mod tools;
mod view;

pub use args::{
    GetChildrenArgs, GetPrefabArgs, InspectObjectArgs, ListPrefabNamesArgs, NoArgs,
    ReadComponentArgs, RunCommandArgs, SceneRootsArgs, SearchObjectsArgs, SearchPrefabsArgs,
    SearchSingletonsArgs,
};
pub use error::ToolError;
pub use registry::{ParameterDescriptor, ToolDescriptor, ToolRegistry};
pub use tools::BridgeTools;
pub use view::HostView;
