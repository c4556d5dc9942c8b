//! Computed properties declared on the struct.

use probe_core::{Introspectable, MemberKind};

#[derive(Introspectable)]
#[introspect(property(health_percentage: f32), property(labels: Vec<String>))]
struct Character {
    health: f32,
    max_health: f32,
}

impl Character {
    fn health_percentage(&self) -> f32 {
        self.health / self.max_health
    }

    fn labels(&self) -> Vec<String> {
        vec![format!("{}/{}", self.health, self.max_health)]
    }
}

fn main() {
    let character = Character {
        health: 5.0,
        max_health: 10.0,
    };
    let members = character.members();
    assert_eq!(members.len(), 4);
    assert_eq!(members[2].kind, MemberKind::Property);
    assert_eq!(members[3].type_tag, "Vec<String>");
    assert!(character.read_member("health_percentage").is_ok());
}
