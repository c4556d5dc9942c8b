//! The boundary between the bridge and host-managed live objects.

use std::any::Any;
use std::sync::Arc;

use crate::Introspectable;

/// Identity handle the host assigns to each live object.
///
/// Unique among live objects only: the host may hand a freed identity to a
/// new object once the original is destroyed.
pub type InstanceId = i32;

/// Type-erasure helper so `Arc<dyn HostObject>` can be downcast.
pub trait AsAny: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// An object owned and tracked by the host simulation.
///
/// The host keeps the owning `Arc`; the bridge only ever holds weak links or
/// short-lived clones while building a response. An object can be destroyed
/// while references to it are still around, so `is_alive` is checked before
/// anything reads it.
pub trait HostObject: AsAny {
    /// Host-assigned identity.
    fn instance_id(&self) -> InstanceId;

    /// Short type name (e.g. `"Rigidbody"`).
    fn type_name(&self) -> &'static str;

    /// Fully qualified type name (e.g. `"UnityEngine.Rigidbody"`).
    fn full_type_name(&self) -> &'static str {
        self.type_name()
    }

    /// Display name.
    fn name(&self) -> String;

    /// Whether the host still considers this object live.
    fn is_alive(&self) -> bool;

    /// Hand the object's member view to `visit`.
    ///
    /// Objects whose state sits behind a lock expose it through this
    /// callback so the view can borrow from the guard. Returns `false` when
    /// the object has no member view.
    fn inspect(&self, visit: &mut dyn FnMut(&dyn Introspectable)) -> bool {
        let _ = visit;
        false
    }

    /// Objects that hang below this one in the host hierarchy.
    fn children(&self) -> Vec<Arc<dyn HostObject>> {
        Vec::new()
    }
}

impl std::fmt::Debug for dyn HostObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostObject")
            .field("instance_id", &self.instance_id())
            .field("type", &self.type_name())
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// Downcast an erased host object to its concrete type.
pub fn downcast_object<T: HostObject>(obj: Arc<dyn HostObject>) -> Option<Arc<T>> {
    obj.into_any_arc().downcast::<T>().ok()
}

/// Strip module paths from a Rust type name, including inside generics.
///
/// `alloc::vec::Vec<core::option::Option<i32>>` becomes `Vec<Option<i32>>`.
#[must_use]
pub fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    for piece in full.split_inclusive(is_type_delimiter) {
        match piece.chars().next_back().filter(|ch| is_type_delimiter(*ch)) {
            Some(delimiter) => {
                push_last_segment(&mut out, piece.strip_suffix(delimiter).unwrap_or(piece));
                out.push(delimiter);
            }
            None => push_last_segment(&mut out, piece),
        }
    }
    out
}

const fn is_type_delimiter(ch: char) -> bool {
    matches!(ch, '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | '&' | ';')
}

fn push_last_segment(out: &mut String, path: &str) {
    out.push_str(path.rsplit("::").next().unwrap_or(path));
}
