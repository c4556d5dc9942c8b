//! Named, renamed, skipped and raw-identifier fields.

use probe_core::Introspectable;
use probe_core::math::{Color, Vector3};

#[derive(Introspectable)]
struct Light {
    pub color: Color,
    pub intensity: f32,
    #[introspect(rename = "m_range")]
    range: f32,
    #[introspect(skip)]
    scratch: Vec<u8>,
    r#type: String,
}

#[derive(Introspectable)]
struct Waypoints(Vec<Vector3>, u32);

#[derive(Introspectable)]
struct Marker;

fn main() {
    let light = Light {
        color: Color::WHITE,
        intensity: 1.0,
        range: 10.0,
        scratch: Vec::new(),
        r#type: "Point".to_owned(),
    };
    assert_eq!(light.members().len(), 4);
    assert!(light.read_member("m_range").is_ok());
    assert!(light.read_member("scratch").is_err());
    assert!(light.read_member("type").is_ok());
    let _ = light.scratch.len();

    let waypoints = Waypoints(Vec::new(), 3);
    assert_eq!(waypoints.members()[1].name, "1");

    assert!(Marker.members().is_empty());
}
