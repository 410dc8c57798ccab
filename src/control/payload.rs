use serde::{Deserialize, Serialize};

/// Mass carried on top of the last stage for the whole ascent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Payload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mass: f64, // kg
}

impl Payload {
    pub fn new(name: impl Into<String>, mass: f64) -> Self {
        Payload {
            name: name.into(),
            mass,
        }
    }

    pub fn none() -> Self {
        Payload::default()
    }

    pub fn get_mass(&self) -> f64 {
        self.mass
    }
}
