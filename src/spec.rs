//! The declarative input the solver consumes.
//!
//! A [`Specification`] arrives already parsed and structurally validated. All
//! lengths are millimetres. The solver trusts the shape of the data but not its
//! geometric consistency: Zone Sizing and the layout stages reject values that
//! cannot be placed without collisions.

use serde::{Deserialize, Serialize};

/// Top-level description of a single mux logic element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Specification {
    /// Element identifier, used for logging and as the assembly name.
    pub name: String,

    /// Diameter shared by every shaft in the element.
    pub shaft_diameter: f64,

    pub gears: GearSpec,
    pub geometry: GeometrySpec,
    pub flexure: FlexureSpec,

    #[serde(default)]
    pub tolerances: ToleranceSpec,
}

/// Gear train parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GearSpec {
    /// Gear module (pitch diameter per tooth).
    pub module: f64,

    /// Pressure angle in degrees. Carried for tooth generation downstream; the
    /// layout does not depend on it.
    #[serde(default = "default_pressure_angle")]
    pub pressure_angle: f64,

    /// Tooth count of the coaxial A/B spur gears.
    pub coaxial_teeth: u32,

    /// Tooth count of each gear of the 1:1 bevel pair.
    pub bevel_teeth: u32,

    pub dog_clutch: DogClutchSpec,
}

fn default_pressure_angle() -> f64 {
    20.0
}

/// Face teeth of the sliding dog clutch.
///
/// Height and depth set the clutch travel, see
/// [`clutch_travel`](crate::zones::clutch_travel).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DogClutchSpec {
    /// Passed through to tooth generation; the layout does not depend on it.
    pub teeth: u32,
    pub tooth_height: f64,
    /// How deep the teeth sink into a gear's face dogs when engaged.
    pub engagement_depth: f64,
}

/// Housing and primary-axis dimensions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeometrySpec {
    /// Nominal axle length. Only used for shafts with no mate information.
    pub axle_length: f64,
    pub housing_thickness: f64,
    /// Total travel of the shift lever, end to end. Must cover the clutch
    /// travel in both directions.
    pub lever_throw: f64,
    pub clutch_width: f64,
    pub gear_face_width: f64,
    /// Gap between neighbouring parts on the primary axis.
    pub gear_spacing: f64,
}

/// Compliant overload element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlexureSpec {
    /// Beam thickness.
    pub thickness: f64,
    /// Beam length.
    pub length: f64,
    /// Largest travel of the driving bevel gear before the clutch slips.
    pub max_deflection: f64,
}

/// Manufacturing tolerances. Defaults suit FDM printing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToleranceSpec {
    /// Radial clearance added to bores for a running shaft fit.
    pub shaft_clearance: f64,
    /// Backlash allowance between meshing teeth.
    pub gear_backlash: f64,
    /// Interference magnitude for press fits, such as the lever pivot in the
    /// back housing.
    pub press_fit_interference: f64,
}

impl Default for ToleranceSpec {
    fn default() -> Self {
        Self {
            shaft_clearance: 0.2,
            gear_backlash: 0.15,
            press_fit_interference: 0.1,
        }
    }
}
