//! Depth- and size-bounded conversion of runtime values into JSON.
//!
//! The output is always finite: object references are emitted as compact
//! `{instanceId, type, name}` nodes and never followed, collections are
//! expanded only while depth remains and only up to the collection cap, and
//! anything without a dedicated encoding degrades to `{type, value}`.
//!
//! Failures are contained to the slot that produced them. A member that
//! cannot be read, or an element whose conversion panics, becomes
//! [`ERROR_SENTINEL`] and the rest of the tree is kept.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde_json::{Map, Number, Value as Json, json};
use tracing::{debug, warn};

use crate::{
    BridgeConfig, HostObject, IdentityCache, Introspectable, MemberKind, Sequence, Value,
};

/// Stand-in for any single value that could not be produced.
pub const ERROR_SENTINEL: &str = "<error reading>";

/// Converts [`Value`]s into bounded JSON trees.
///
/// Cheap to clone; clones share the identity cache.
#[derive(Clone)]
pub struct ValueSerializer {
    cache: Arc<IdentityCache>,
    collection_cap: usize,
    member_cap: usize,
}

impl std::fmt::Debug for ValueSerializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueSerializer")
            .field("collection_cap", &self.collection_cap)
            .field("member_cap", &self.member_cap)
            .finish_non_exhaustive()
    }
}

impl ValueSerializer {
    #[must_use]
    pub fn new(cache: Arc<IdentityCache>, config: &BridgeConfig) -> Self {
        Self {
            cache,
            collection_cap: config.collection_cap,
            member_cap: config.member_cap,
        }
    }

    /// The cache object references are registered into.
    #[must_use]
    pub fn cache(&self) -> &Arc<IdentityCache> {
        &self.cache
    }

    /// Serialize `value`, expanding collections at most `max_depth` levels.
    pub fn serialize(&self, value: &Value<'_>, max_depth: i32) -> Json {
        guarded(|| self.serialize_inner(value, max_depth))
    }

    /// Compact reference node for a host object; `null` if it was destroyed.
    ///
    /// The object is registered in the identity cache on the way.
    pub fn object_ref(&self, obj: &Arc<dyn HostObject>) -> Json {
        if !obj.is_alive() {
            return Json::Null;
        }
        let id = self.cache.register(obj);
        json!({
            "instanceId": id,
            "type": obj.type_name(),
            "name": obj.name(),
        })
    }

    /// Dump the members of `target`, each serialized at `max_depth - 1`.
    ///
    /// At most `member_cap` fields and `member_cap` properties are read.
    /// Unreadable members become [`ERROR_SENTINEL`].
    pub fn dump_members(&self, target: &dyn Introspectable, max_depth: i32) -> Map<String, Json> {
        let Ok(members) = panic::catch_unwind(AssertUnwindSafe(|| target.members())) else {
            warn!("member listing panicked, dumping nothing");
            return Map::new();
        };
        let fields = members
            .iter()
            .filter(|m| m.kind == MemberKind::Field)
            .take(self.member_cap);
        let properties = members
            .iter()
            .filter(|m| m.kind == MemberKind::Property)
            .take(self.member_cap);

        let mut out = Map::new();
        for member in fields.chain(properties) {
            let node = guarded(|| match target.read_member(member.name) {
                Ok(value) => self.serialize_inner(&value, max_depth - 1),
                Err(err) => {
                    debug!(member = member.name, %err, "member unreadable");
                    sentinel()
                }
            });
            out.insert(member.name.to_owned(), node);
        }
        out
    }

    /// Member dump of a host object, or `None` if it exposes no member view.
    ///
    /// The dump is a JSON object, or [`ERROR_SENTINEL`] when opening the
    /// member view panicked.
    pub fn dump_object(&self, obj: &dyn HostObject, max_depth: i32) -> Option<Json> {
        let mut dump = None;
        let opened = panic::catch_unwind(AssertUnwindSafe(|| {
            obj.inspect(&mut |target| {
                dump = Some(self.dump_members(target, max_depth));
            })
        }));
        match opened {
            Ok(true) => dump.map(Json::Object),
            Ok(false) => None,
            Err(_) => {
                warn!(
                    instance_id = obj.instance_id(),
                    "member view panicked, substituting sentinel"
                );
                Some(sentinel())
            }
        }
    }

    /// Hierarchy snapshot: reference fields, member dump, and children
    /// expanded while depth remains.
    ///
    /// Only `children()` links are followed. Every other object reference
    /// inside the member dump stays compact, so back-references to
    /// ancestors cannot loop.
    pub fn snapshot(&self, obj: &Arc<dyn HostObject>, max_depth: i32) -> Json {
        guarded(|| self.snapshot_inner(obj, max_depth))
    }

    fn snapshot_inner(&self, obj: &Arc<dyn HostObject>, max_depth: i32) -> Json {
        let Json::Object(mut node) = self.object_ref(obj) else {
            return Json::Null;
        };

        if let Some(members) = self.dump_object(&**obj, max_depth) {
            node.insert("members".to_owned(), members);
        }

        let children = obj.children();
        let expanded = if max_depth > 0 && children.len() <= self.collection_cap {
            Json::Array(
                children
                    .iter()
                    .map(|child| guarded(|| self.snapshot_inner(child, max_depth - 1)))
                    .collect(),
            )
        } else {
            summary("children", children.len())
        };
        node.insert("children".to_owned(), expanded);
        Json::Object(node)
    }

    fn serialize_inner(&self, value: &Value<'_>, max_depth: i32) -> Json {
        match value {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::from(*i),
            Value::UInt(u) => Json::from(*u),
            Value::Float(f) => number(*f),
            Value::Str(s) => Json::String(s.to_string()),
            Value::Enum { variant, .. } => Json::String((*variant).to_owned()),
            Value::Vector2(v) => labeled(&[("x", v.x), ("y", v.y)]),
            Value::Vector3(v) => labeled(&[("x", v.x), ("y", v.y), ("z", v.z)]),
            Value::Quaternion(q) => labeled(&[("x", q.x), ("y", q.y), ("z", q.z), ("w", q.w)]),
            Value::Color(c) => labeled(&[("r", c.r), ("g", c.g), ("b", c.b), ("a", c.a)]),
            Value::Object(obj) => self.object_ref(obj),
            Value::Seq(seq) => self.sequence(*seq, max_depth),
            Value::Opaque { type_name, display } => json!({
                "type": type_name,
                "value": display,
            }),
            Value::Owned(inner) => self.serialize_inner(&inner.to_value(), max_depth),
        }
    }

    fn sequence(&self, seq: &dyn Sequence, max_depth: i32) -> Json {
        let len = seq.len();
        if max_depth <= 0 || len > self.collection_cap {
            return summary(&seq.type_name(), len);
        }
        Json::Array(
            (0..len)
                .map(|index| guarded(|| self.serialize_inner(&seq.item(index), max_depth - 1)))
                .collect(),
        )
    }
}

/// `{type, size}` node for a collection that was not expanded.
fn summary(type_name: &str, size: usize) -> Json {
    json!({ "type": type_name, "size": size })
}

fn sentinel() -> Json {
    Json::String(ERROR_SENTINEL.to_owned())
}

/// JSON has no NaN or infinities; those travel as their string form.
fn number(value: f64) -> Json {
    Number::from_f64(value).map_or_else(|| Json::String(value.to_string()), Json::Number)
}

fn labeled(fields: &[(&str, f32)]) -> Json {
    let map = fields
        .iter()
        .map(|(key, value)| ((*key).to_owned(), number(f64::from(*value))))
        .collect();
    Json::Object(map)
}

/// Run one slot's conversion; a panic becomes the sentinel.
fn guarded(convert: impl FnOnce() -> Json) -> Json {
    panic::catch_unwind(AssertUnwindSafe(convert)).unwrap_or_else(|_| {
        warn!("value conversion panicked, substituting sentinel");
        sentinel()
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::math::{Color, Quaternion, Vector2, Vector3};
    use crate::{BridgeError, InstanceId, MemberInfo, ToValue};

    fn serializer() -> ValueSerializer {
        ValueSerializer::new(Arc::new(IdentityCache::new()), &BridgeConfig::default())
    }

    struct Thing {
        id: InstanceId,
        alive: AtomicBool,
    }

    impl HostObject for Thing {
        fn instance_id(&self) -> InstanceId {
            self.id
        }

        fn type_name(&self) -> &'static str {
            "Thing"
        }

        fn name(&self) -> String {
            "thing".to_owned()
        }

        fn is_alive(&self) -> bool {
            self.alive.load(Ordering::Acquire)
        }
    }

    fn thing(id: InstanceId) -> Arc<Thing> {
        Arc::new(Thing {
            id,
            alive: AtomicBool::new(true),
        })
    }

    struct Flaky {
        values: Vec<i32>,
    }

    static FLAKY_MEMBERS: &[MemberInfo] = &[
        MemberInfo {
            name: "values",
            type_tag: "Vec<i32>",
            kind: MemberKind::Field,
            public: true,
        },
        MemberInfo {
            name: "locked",
            type_tag: "i32",
            kind: MemberKind::Field,
            public: false,
        },
        MemberInfo {
            name: "explodes",
            type_tag: "i32",
            kind: MemberKind::Property,
            public: true,
        },
    ];

    impl Introspectable for Flaky {
        fn members(&self) -> &'static [MemberInfo] {
            FLAKY_MEMBERS
        }

        fn read_member(&self, name: &str) -> Result<Value<'_>, BridgeError> {
            match name {
                "values" => Ok(self.values.to_value()),
                "locked" => Err(BridgeError::Unreadable {
                    member: name.to_owned(),
                    reason: "access denied".to_owned(),
                }),
                "explodes" => panic!("getter blew up"),
                _ => Err(BridgeError::MemberNotFound(name.to_owned())),
            }
        }
    }

    #[test]
    fn test_scalars_pass_through() {
        let s = serializer();
        assert_eq!(s.serialize(&Value::Null, 1), Json::Null);
        assert_eq!(s.serialize(&true.to_value(), 1), json!(true));
        assert_eq!(s.serialize(&i64::MAX.to_value(), 1), json!(i64::MAX));
        assert_eq!(s.serialize(&u64::MAX.to_value(), 1), json!(u64::MAX));
        assert_eq!(s.serialize(&2.5f64.to_value(), 1), json!(2.5));
        assert_eq!(s.serialize(&"hello".to_value(), 1), json!("hello"));
    }

    #[test]
    fn test_scalars_ignore_depth() {
        let s = serializer();
        assert_eq!(s.serialize(&42i32.to_value(), 0), json!(42));
        assert_eq!(s.serialize(&42i32.to_value(), -3), json!(42));
    }

    #[test]
    fn test_non_finite_floats_become_strings() {
        let s = serializer();
        assert_eq!(s.serialize(&f64::NAN.to_value(), 1), json!("NaN"));
        assert_eq!(s.serialize(&f64::INFINITY.to_value(), 1), json!("inf"));
    }

    #[test]
    fn test_enum_uses_symbolic_name() {
        let s = serializer();
        let value = Value::Enum {
            type_name: "LightType",
            variant: "Directional",
        };
        assert_eq!(s.serialize(&value, 1), json!("Directional"));
    }

    #[test]
    fn test_geometric_shapes() {
        let s = serializer();
        assert_eq!(
            s.serialize(&Vector2::new(1.0, 2.0).to_value(), 0),
            json!({"x": 1.0, "y": 2.0})
        );
        assert_eq!(
            s.serialize(&Vector3::new(1.0, 2.0, 3.0).to_value(), 0),
            json!({"x": 1.0, "y": 2.0, "z": 3.0})
        );
        assert_eq!(
            s.serialize(&Quaternion::IDENTITY.to_value(), 0),
            json!({"x": 0.0, "y": 0.0, "z": 0.0, "w": 1.0})
        );
        assert_eq!(
            s.serialize(&Color::new(1.0, 0.5, 0.25, 1.0).to_value(), 0),
            json!({"r": 1.0, "g": 0.5, "b": 0.25, "a": 1.0})
        );
    }

    #[test]
    fn test_object_reference_is_compact_and_cached() {
        let s = serializer();
        let obj = thing(77);

        let node = s.serialize(&obj.to_value(), 3);
        assert_eq!(node, json!({"instanceId": 77, "type": "Thing", "name": "thing"}));
        assert!(s.cache().resolve(77).is_some());
    }

    #[test]
    fn test_destroyed_reference_is_null() {
        let s = serializer();
        let obj = thing(12);
        obj.alive.store(false, Ordering::Release);

        assert_eq!(s.serialize(&obj.to_value(), 1), Json::Null);
        assert!(s.cache().is_empty());
    }

    #[test]
    fn test_finalized_weak_reference_is_null() {
        let s = serializer();
        let obj = thing(13);
        let weak = Arc::downgrade(&obj);
        drop(obj);

        assert_eq!(s.serialize(&weak.to_value(), 1), Json::Null);
    }

    #[test]
    fn test_collection_within_cap_expands() {
        let s = serializer();
        let values = vec![1, 2, 3];
        assert_eq!(s.serialize(&values.to_value(), 1), json!([1, 2, 3]));
    }

    #[test]
    fn test_collection_over_cap_is_summarised() {
        let s = serializer();
        let values: Vec<u8> = (0..21).collect();
        assert_eq!(
            s.serialize(&values.to_value(), 5),
            json!({"type": "Vec<u8>", "size": 21})
        );
    }

    #[test]
    fn test_collection_at_depth_zero_is_summarised() {
        let s = serializer();
        let values = vec![1, 2, 3];
        assert_eq!(
            s.serialize(&values.to_value(), 0),
            json!({"type": "Vec<i32>", "size": 3})
        );
    }

    #[test]
    fn test_nested_collections_respect_depth() {
        let s = serializer();
        let nested = vec![vec![vec![1]]];
        assert_eq!(
            s.serialize(&nested.to_value(), 2),
            json!([[{"type": "Vec<i32>", "size": 1}]])
        );
    }

    #[test]
    fn test_opaque_fallback() {
        let s = serializer();
        let value = Value::opaque(&(1, "two"));
        assert_eq!(
            s.serialize(&value, 1),
            json!({"type": "(i32, &str)", "value": "(1, \"two\")"})
        );
    }

    #[test]
    fn test_owned_values_serialize_like_borrowed() {
        let s = serializer();
        let value = Value::owned(vec![Vector2::new(0.0, 1.0)]);
        assert_eq!(s.serialize(&value, 1), json!([{"x": 0.0, "y": 1.0}]));
    }

    #[test]
    fn test_member_failures_are_isolated() {
        let s = serializer();
        let flaky = Flaky { values: vec![4, 5] };

        let dump = s.dump_members(&flaky, 2);
        assert_eq!(dump["values"], json!([4, 5]));
        assert_eq!(dump["locked"], json!(ERROR_SENTINEL));
        assert_eq!(dump["explodes"], json!(ERROR_SENTINEL));
    }

    #[test]
    fn test_member_values_use_reduced_depth() {
        let s = serializer();
        let flaky = Flaky { values: vec![4, 5] };

        let dump = s.dump_members(&flaky, 1);
        assert_eq!(dump["values"], json!({"type": "Vec<i32>", "size": 2}));
    }

    #[test]
    fn test_member_cap_applies_per_kind() {
        let cache = Arc::new(IdentityCache::new());
        let config = BridgeConfig {
            member_cap: 1,
            ..BridgeConfig::default()
        };
        let s = ValueSerializer::new(cache, &config);
        let flaky = Flaky { values: vec![] };

        let dump = s.dump_members(&flaky, 1);
        let keys: Vec<&str> = dump.keys().map(String::as_str).collect();
        assert!(keys.contains(&"values"));
        assert!(!keys.contains(&"locked"));
        assert!(keys.contains(&"explodes"));
    }

    struct Grumpy;

    impl HostObject for Grumpy {
        fn instance_id(&self) -> InstanceId {
            9
        }

        fn type_name(&self) -> &'static str {
            "Grumpy"
        }

        fn name(&self) -> String {
            "grumpy".to_owned()
        }

        fn is_alive(&self) -> bool {
            true
        }

        fn inspect(&self, _visit: &mut dyn FnMut(&dyn Introspectable)) -> bool {
            panic!("state lock poisoned")
        }
    }

    #[test]
    fn test_panicking_member_view_costs_only_members() {
        let s = serializer();
        assert_eq!(s.dump_object(&Grumpy, 1), Some(json!(ERROR_SENTINEL)));

        let obj: Arc<dyn HostObject> = Arc::new(Grumpy);
        let node = s.snapshot(&obj, 1);
        assert_eq!(node["name"], "grumpy");
        assert_eq!(node["members"], ERROR_SENTINEL);
        assert_eq!(node["children"], json!([]));
    }

    #[test]
    fn test_object_without_member_view() {
        let s = serializer();
        let obj = thing(1);
        assert!(s.dump_object(&*obj, 1).is_none());
    }
}
