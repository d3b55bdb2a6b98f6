//! Zone Sizing: how much room each functional group of parts needs.
//!
//! Every derived constant of the layout (bevel pitch radius, bevel face width,
//! zone lengths, the secondary-axis offset) is computed here exactly once and
//! handed to the layout stages inside [`ZoneSizes`]. The later stages never
//! recompute any of these formulas.

use crate::error::{LayoutError, LayoutResult, positive};
use crate::spec::Specification;
use serde::{Deserialize, Serialize};

/// Bevel face width as a multiple of the module (20° straight-bevel profile).
pub const BEVEL_FACE_WIDTH_RATIO: f64 = 2.5;

/// Clearance allowance included in the bevel conversion zone.
pub const BEVEL_CLEARANCE_MM: f64 = 5.0;

/// Gap between the driven bevel gear and the lever.
pub const DRIVEN_GEAR_CLEARANCE_MM: f64 = 2.0;

/// Lateral margin between the primary gear envelope and the secondary shaft.
pub const SECONDARY_STANDOFF_MM: f64 = 15.0;

/// How far a shaft must run past its farthest mated feature.
pub const SHAFT_OVERRUN_MM: f64 = 10.0;

/// Span of one part on the primary axis, including the gap that follows it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrimaryZone {
    /// Thickness of the part itself along the axis.
    pub part: f64,
    /// Gap left after the part before the next one starts.
    pub gap: f64,
}

impl PrimaryZone {
    pub fn length(&self) -> f64 {
        self.part + self.gap
    }
}

/// The five primary-axis contributions in placement order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrimaryZones {
    pub back_housing: PrimaryZone,
    pub gear_b: PrimaryZone,
    pub clutch: PrimaryZone,
    pub gear_a: PrimaryZone,
    pub front_housing: PrimaryZone,
}

impl PrimaryZones {
    /// Sum of the five contributions.
    pub fn total(&self) -> f64 {
        self.back_housing.length()
            + self.gear_b.length()
            + self.clutch.length()
            + self.gear_a.length()
            + self.front_housing.length()
    }
}

/// Bevel pair dimensions shared by both gears of the 1:1 pair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BevelSizing {
    pub pitch_radius: f64,
    pub face_width: f64,
    /// Length of the conversion zone reserved on the primary axis.
    pub zone_length: f64,
}

/// Everything the layout stages need, computed once from the specification.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoneSizes {
    pub primary: PrimaryZones,
    pub gear_pair_zone: f64,
    pub bevel: BevelSizing,
    /// Pitch radius of the coaxial A/B gears.
    pub gear_pitch_radius: f64,
    /// Outer radius of the coaxial gear envelope.
    pub gear_outer_radius: f64,
    /// Lateral distance from the primary axis to the secondary shaft.
    pub secondary_offset: f64,
    /// Axial travel of the dog clutch from neutral to full engagement.
    pub clutch_travel: f64,
}

impl ZoneSizes {
    /// Sizes every zone of the element described by `spec`.
    ///
    /// # Errors
    ///
    /// - [`LayoutError::InvalidGeometry`] if any zone or offset comes out
    ///   non-positive or non-finite. Nothing is clamped.
    /// - [`LayoutError::GeometryOverflow`] if the clutch cannot shift inside
    ///   the gear spacing; see [`clutch_travel`].
    pub fn from_spec(spec: &Specification) -> LayoutResult<Self> {
        let bevel = bevel_sizing(spec)?;
        let gear_pitch_radius = positive(
            "coaxial gear pitch radius",
            spec.gears.module * f64::from(spec.gears.coaxial_teeth) / 2.0,
        )?;
        let primary = primary_zones(spec)?;

        Ok(Self {
            primary,
            gear_pair_zone: gear_pair_zone(spec)?,
            bevel,
            gear_pitch_radius,
            gear_outer_radius: primary_gear_outer_diameter(spec)? / 2.0,
            secondary_offset: secondary_offset(spec)?,
            clutch_travel: clutch_travel(spec)?,
        })
    }
}

/// `fwA + spacing + clutch + spacing + fwB`.
pub fn gear_pair_zone(spec: &Specification) -> LayoutResult<f64> {
    let g = &spec.geometry;
    positive(
        "gear pair zone",
        g.gear_face_width + g.gear_spacing + g.clutch_width + g.gear_spacing + g.gear_face_width,
    )
}

pub fn bevel_pitch_radius(spec: &Specification) -> LayoutResult<f64> {
    positive(
        "bevel pitch radius",
        spec.gears.module * f64::from(spec.gears.bevel_teeth) / 2.0,
    )
}

pub fn bevel_face_width(spec: &Specification) -> LayoutResult<f64> {
    positive("bevel face width", BEVEL_FACE_WIDTH_RATIO * spec.gears.module)
}

/// Pitch radius, face width and the conversion zone reserved for the bevel pair.
pub fn bevel_sizing(spec: &Specification) -> LayoutResult<BevelSizing> {
    let pitch_radius = bevel_pitch_radius(spec)?;
    let face_width = bevel_face_width(spec)?;
    let zone_length = positive(
        "bevel conversion zone",
        pitch_radius + face_width + BEVEL_CLEARANCE_MM,
    )?;
    Ok(BevelSizing {
        pitch_radius,
        face_width,
        zone_length,
    })
}

/// `module * coaxial_teeth`.
///
/// The layout treats the pitch circle as the coaxial gear's clearance envelope;
/// tooth tips are covered by the standoff margin.
pub fn primary_gear_outer_diameter(spec: &Specification) -> LayoutResult<f64> {
    positive(
        "primary gear outer diameter",
        spec.gears.module * f64::from(spec.gears.coaxial_teeth),
    )
}

/// Lateral offset of the secondary shaft from the primary axis.
pub fn secondary_offset(spec: &Specification) -> LayoutResult<f64> {
    let outer = primary_gear_outer_diameter(spec)?;
    positive("secondary axis offset", outer / 2.0 + SECONDARY_STANDOFF_MM)
}

/// Per-part spans along the primary axis, back to front.
pub fn primary_zones(spec: &Specification) -> LayoutResult<PrimaryZones> {
    let g = &spec.geometry;
    let housing = positive("housing thickness", g.housing_thickness)?;
    let face = positive("gear face width", g.gear_face_width)?;
    let clutch = positive("clutch width", g.clutch_width)?;
    let gap = g.gear_spacing;
    if !gap.is_finite() || gap < 0.0 {
        return Err(LayoutError::invalid("gear spacing", gap));
    }

    Ok(PrimaryZones {
        back_housing: PrimaryZone { part: housing, gap },
        gear_b: PrimaryZone { part: face, gap },
        clutch: PrimaryZone { part: clutch, gap },
        gear_a: PrimaryZone { part: face, gap },
        front_housing: PrimaryZone {
            part: housing,
            gap: 0.0,
        },
    })
}

/// Axial travel of the dog clutch from neutral to full engagement with one gear.
///
/// In neutral the dog teeth stand `tooth_height` into the gap on each side and
/// must not reach the gear face. Engaging closes the rest of the gap and sinks
/// the teeth `engagement_depth` into the gear's face dogs, so the travel is
/// `gear_spacing − tooth_height + engagement_depth`. The lever throw must cover
/// the travel both ways.
///
/// # Errors
///
/// - [`LayoutError::InvalidGeometry`] for a non-positive tooth height,
///   engagement depth or lever throw.
/// - [`LayoutError::GeometryOverflow`] if the teeth fill the gap in neutral, the
///   engagement is deeper than the teeth, or the throw is short of the travel.
pub fn clutch_travel(spec: &Specification) -> LayoutResult<f64> {
    let dog = &spec.gears.dog_clutch;
    let tooth_height = positive("dog tooth height", dog.tooth_height)?;
    let depth = positive("dog engagement depth", dog.engagement_depth)?;
    let throw = positive("lever throw", spec.geometry.lever_throw)?;
    let gap = spec.geometry.gear_spacing;

    if tooth_height >= gap {
        return Err(LayoutError::overflow(
            "dog clutch neutral clearance",
            tooth_height,
            gap,
        ));
    }
    if depth > tooth_height {
        return Err(LayoutError::overflow("dog tooth engagement", depth, tooth_height));
    }
    let travel = gap - tooth_height + depth;
    if 2.0 * travel > throw {
        return Err(LayoutError::overflow("lever throw", 2.0 * travel, throw));
    }
    Ok(travel)
}

/// Conversion-zone length the secondary stage actually needs.
///
/// The driving gear sits one pitch radius from the clutch and the driven gear
/// `face_width + 2` from it. While the flexure is deflected the driving gear
/// may also walk `max_deflection` away from the mesh.
pub fn conversion_requirement(spec: &Specification, bevel: &BevelSizing) -> f64 {
    bevel.pitch_radius
        + bevel.face_width
        + DRIVEN_GEAR_CLEARANCE_MM
        + spec.flexure.max_deflection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{DogClutchSpec, FlexureSpec, GearSpec, GeometrySpec, ToleranceSpec};
    use approx::assert_relative_eq;

    fn spec(module: f64, bevel_teeth: u32) -> Specification {
        Specification {
            name: "zones".to_string(),
            shaft_diameter: 6.0,
            gears: GearSpec {
                module,
                pressure_angle: 20.0,
                coaxial_teeth: 24,
                bevel_teeth,
                dog_clutch: DogClutchSpec {
                    teeth: 6,
                    tooth_height: 2.0,
                    engagement_depth: 1.5,
                },
            },
            geometry: GeometrySpec {
                axle_length: 60.0,
                housing_thickness: 4.0,
                lever_throw: 8.0,
                clutch_width: 10.0,
                gear_face_width: 8.0,
                gear_spacing: 3.0,
            },
            flexure: FlexureSpec {
                thickness: 1.2,
                length: 15.0,
                max_deflection: 2.0,
            },
            tolerances: ToleranceSpec::default(),
        }
    }

    #[test]
    fn bevel_zone_covers_radius_face_and_clearance() {
        let bevel = bevel_sizing(&spec(1.5, 16)).unwrap();
        assert_relative_eq!(bevel.pitch_radius, 12.0);
        assert_relative_eq!(bevel.face_width, 3.75);
        assert_relative_eq!(bevel.zone_length, 20.75);
    }

    #[test]
    fn primary_zones_sum_to_element_length() {
        let zones = primary_zones(&spec(1.5, 16)).unwrap();
        // back 4+3, gear B 8+3, clutch 10+3, gear A 8+3, front 4
        assert_relative_eq!(zones.total(), 46.0);
    }

    #[test]
    fn secondary_offset_clears_gear_envelope() {
        let s = spec(1.5, 16);
        assert_relative_eq!(secondary_offset(&s).unwrap(), 33.0);
        assert!(secondary_offset(&s).unwrap() > primary_gear_outer_diameter(&s).unwrap() / 2.0);
    }

    #[test]
    fn zero_teeth_are_rejected_not_clamped() {
        let err = ZoneSizes::from_spec(&spec(1.5, 0)).unwrap_err();
        assert_eq!(err, LayoutError::invalid("bevel pitch radius", 0.0));
    }

    #[test]
    fn clutch_travel_closes_gap_and_sinks_teeth() {
        // 3 mm gap, 2 mm teeth, 1.5 mm engagement.
        assert_relative_eq!(clutch_travel(&spec(1.5, 16)).unwrap(), 2.5);
        assert_relative_eq!(ZoneSizes::from_spec(&spec(1.5, 16)).unwrap().clutch_travel, 2.5);
    }

    #[test]
    fn teeth_filling_the_gap_overflow() {
        let mut s = spec(1.5, 16);
        s.gears.dog_clutch.tooth_height = 3.0;
        assert_eq!(
            clutch_travel(&s).unwrap_err(),
            LayoutError::overflow("dog clutch neutral clearance", 3.0, 3.0)
        );
    }

    #[test]
    fn engagement_deeper_than_teeth_overflows() {
        let mut s = spec(1.5, 16);
        s.gears.dog_clutch.engagement_depth = 2.5;
        assert_eq!(
            clutch_travel(&s).unwrap_err(),
            LayoutError::overflow("dog tooth engagement", 2.5, 2.0)
        );
    }

    #[test]
    fn short_lever_throw_overflows() {
        let mut s = spec(1.5, 16);
        s.geometry.lever_throw = 4.0;
        assert_eq!(
            ZoneSizes::from_spec(&s).unwrap_err(),
            LayoutError::overflow("lever throw", 5.0, 4.0)
        );
    }

    #[test]
    fn conversion_requirement_includes_deflection_pocket() {
        let s = spec(1.5, 16);
        let bevel = bevel_sizing(&s).unwrap();
        assert_relative_eq!(conversion_requirement(&s, &bevel), 19.75);
    }
}
