//! Enums serialize by variant name; structs fall back to Debug.

use probe_core::{ToValue, Value};

#[derive(Clone, Copy, Debug, ToValue)]
enum Faction {
    Players,
    ForestMonsters,
}

#[derive(Debug, ToValue)]
enum Shape {
    Sphere { radius: f32 },
    Box(f32, f32, f32),
    Empty,
}

#[derive(Debug, ToValue)]
struct Handle {
    slot: u32,
}

fn main() {
    let Value::Enum { variant, .. } = Faction::ForestMonsters.to_value() else {
        panic!("expected enum");
    };
    assert_eq!(variant, "ForestMonsters");

    let Value::Enum { variant, .. } = Shape::Box(1.0, 2.0, 3.0).to_value() else {
        panic!("expected enum");
    };
    assert_eq!(variant, "Box");
    let _ = (Faction::Players, Shape::Sphere { radius: 1.0 }, Shape::Empty);

    assert!(matches!(Handle { slot: 1 }.to_value(), Value::Opaque { .. }));
}
