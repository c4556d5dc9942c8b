//! Introspection core for a live, single-threaded host.
//!
//! Three pieces, used together by the tool layer:
//!
//! - [`IdentityCache`]: instance id → weak reference to a live host object.
//! - [`ValueSerializer`]: runtime [`Value`]s → bounded, acyclic JSON.
//! - [`MainLoopDispatcher`]: caller threads → actions run on the host tick.
//!
//! # Usage
//!
//! ```ignore
//! use probe_core::{Introspectable, ToValue};
//! use probe_core::math::Vector3;
//!
//! #[derive(Introspectable)]
//! #[introspect(property(speed: f32))]
//! pub struct Rigidbody {
//!     pub mass: f32,
//!     pub velocity: Vector3,
//! }
//!
//! #[derive(Clone, Copy, Debug, ToValue)]
//! pub enum LightType { Spot, Directional, Point }
//! ```

#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

mod config;
mod dispatcher;
mod error;
mod host;
mod identity;
pub mod math;
mod serializer;
mod traits;
mod value;

pub use config::BridgeConfig;
pub use dispatcher::{Action, DispatchHandle, DrainStats, MainLoopDispatcher, Reply};
pub use error::BridgeError;
pub use host::{AsAny, HostObject, InstanceId, downcast_object, short_type_name};
pub use identity::IdentityCache;
pub use probe_introspect_derive::{Introspectable, ToValue};
pub use serializer::{ERROR_SENTINEL, ValueSerializer};
pub use traits::{Introspectable, MemberInfo, MemberKind};
pub use value::{Sequence, ToValue, Value};
