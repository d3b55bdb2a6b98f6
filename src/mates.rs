//! Mate Registry: declared kinematic relationships between placed parts.
//!
//! The registry is a declaration, not an enforcement mechanism. It records which
//! parts are fitted, meshed or pivoted together and with what clearance, in the
//! order the layout stages declare them. Geometry is checked where parts are
//! placed, never here.

use serde::{Deserialize, Serialize};

/// Kind of kinematic relationship.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MateKind {
    /// A shaft running in a bore.
    ShaftFit,
    /// A stationary pin held in a bore by interference.
    PressFit,
    /// Two gears in mesh.
    GearMesh,
    /// A lever turning with its pivot.
    Pivot,
    /// The lever fork riding in the clutch's shift groove.
    ForkGroove,
    /// The clutch's dog teeth meeting the face dogs of a coaxial gear.
    DogEngagement,
    /// Two parts clamped face to face.
    Abutment,
}

/// One declared relationship. `clearance` is the radial clearance for fits and
/// the backlash for meshes, in millimetres. Press fits store the interference
/// as a negative clearance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mate {
    pub part_a: String,
    pub part_b: String,
    pub kind: MateKind,
    pub clearance: f64,
}

impl Mate {
    pub fn involves(&self, id: &str) -> bool {
        self.part_a == id || self.part_b == id
    }

    /// The part on the other side of the mate, if `id` is one side of it.
    pub fn other(&self, id: &str) -> Option<&str> {
        if self.part_a == id {
            Some(&self.part_b)
        } else if self.part_b == id {
            Some(&self.part_a)
        } else {
            None
        }
    }
}

/// Ordered list of mates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MateRegistry {
    mates: Vec<Mate>,
}

impl MateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(
        &mut self,
        part_a: impl Into<String>,
        part_b: impl Into<String>,
        kind: MateKind,
        clearance: f64,
    ) {
        self.mates.push(Mate {
            part_a: part_a.into(),
            part_b: part_b.into(),
            kind,
            clearance,
        });
    }

    pub fn shaft_fit(&mut self, shaft: &str, part: &str, clearance: f64) {
        self.declare(shaft, part, MateKind::ShaftFit, clearance);
    }

    pub fn press_fit(&mut self, pin: &str, part: &str, interference: f64) {
        self.declare(pin, part, MateKind::PressFit, -interference);
    }

    pub fn gear_mesh(&mut self, driving: &str, driven: &str, backlash: f64) {
        self.declare(driving, driven, MateKind::GearMesh, backlash);
    }

    pub fn pivot(&mut self, pivot: &str, lever: &str, clearance: f64) {
        self.declare(pivot, lever, MateKind::Pivot, clearance);
    }

    pub fn fork_groove(&mut self, clutch: &str, lever: &str, clearance: f64) {
        self.declare(clutch, lever, MateKind::ForkGroove, clearance);
    }

    pub fn dog_engagement(&mut self, clutch: &str, gear: &str) {
        self.declare(clutch, gear, MateKind::DogEngagement, 0.0);
    }

    pub fn abutment(&mut self, part: &str, support: &str) {
        self.declare(part, support, MateKind::Abutment, 0.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mate> {
        self.mates.iter()
    }

    pub fn len(&self) -> usize {
        self.mates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mates.is_empty()
    }

    /// Every mate `id` takes part in, in declaration order.
    pub fn mates_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Mate> + 'a {
        self.mates.iter().filter(move |m| m.involves(id))
    }

    /// Whether `a` and `b` are declared to mate, in either direction.
    pub fn are_mated(&self, a: &str, b: &str) -> bool {
        self.mates.iter().any(|m| m.other(a) == Some(b))
    }

    pub fn into_vec(self) -> Vec<Mate> {
        self.mates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_declaration_order() {
        let mut registry = MateRegistry::new();
        registry.shaft_fit("axle_secondary", "bevel_driving", 0.2);
        registry.gear_mesh("bevel_driving", "bevel_driven", 0.15);
        registry.pivot("lever_pivot", "lever", 0.2);

        let kinds: Vec<_> = registry.iter().map(|m| m.kind).collect();
        assert_eq!(
            kinds,
            vec![MateKind::ShaftFit, MateKind::GearMesh, MateKind::Pivot]
        );
    }

    #[test]
    fn press_fit_stores_interference_as_negative_clearance() {
        let mut registry = MateRegistry::new();
        registry.press_fit("lever_pivot", "housing_back", 0.1);
        let mate = registry.iter().next().unwrap();
        assert_eq!(mate.kind, MateKind::PressFit);
        assert_eq!(mate.clearance, -0.1);
    }

    #[test]
    fn mated_lookup_is_symmetric() {
        let mut registry = MateRegistry::new();
        registry.gear_mesh("bevel_driving", "bevel_driven", 0.15);

        assert!(registry.are_mated("bevel_driving", "bevel_driven"));
        assert!(registry.are_mated("bevel_driven", "bevel_driving"));
        assert!(!registry.are_mated("bevel_driving", "lever"));
    }

    #[test]
    fn mates_of_filters_by_part() {
        let mut registry = MateRegistry::new();
        registry.shaft_fit("axle_main", "gear_a", 0.2);
        registry.shaft_fit("axle_main", "gear_b", 0.2);
        registry.fork_groove("dog_clutch", "lever", 0.5);

        let others: Vec<_> = registry
            .mates_of("axle_main")
            .filter_map(|m| m.other("axle_main"))
            .collect();
        assert_eq!(others, vec!["gear_a", "gear_b"]);
    }
}
