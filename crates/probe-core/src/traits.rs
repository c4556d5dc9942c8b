//! The Introspectable trait: an explicit member view of an object.

use crate::{BridgeError, Value};

/// Whether a member is stored data or computed on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Field,
    Property,
}

/// Static description of one member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberInfo {
    /// Member name as it appears in dumps.
    pub name: &'static str,
    /// Declared type, as written in source.
    pub type_tag: &'static str,
    pub kind: MemberKind,
    /// `false` for non-public members. Dumps include both.
    pub public: bool,
}

/// Types that can list and read their own members.
///
/// This is typically derived:
///
/// ```ignore
/// use probe_core::Introspectable;
///
/// #[derive(Introspectable)]
/// #[introspect(property(speed: f32))]
/// pub struct Rigidbody {
///     pub mass: f32,
///     pub velocity: Vector3,
///     #[introspect(skip)]
///     scratch: Vec<u8>,
/// }
///
/// impl Rigidbody {
///     fn speed(&self) -> f32 { self.velocity.length() }
/// }
/// ```
///
/// Fields come first in declaration order, then properties in attribute
/// order. That order is what dumps show.
pub trait Introspectable {
    /// All readable members, fields before properties.
    fn members(&self) -> &'static [MemberInfo];

    /// Read one member by name.
    fn read_member(&self, name: &str) -> Result<Value<'_>, BridgeError>;
}
