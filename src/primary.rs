//! Primary Axis Layout.
//!
//! Stacks every part that turns on the main axis along +Z, back to front:
//! back housing, spacer, gear B, clutch, gear A, spacer, the reserved bevel
//! conversion zone, front housing. The back housing's outer face sits at Z = 0.
//!
//! The gaps either side of the clutch stay open for its shift travel. The two
//! spacers fill the gaps that locate the gear pair axially: one between the
//! back housing and gear B, one outboard of gear A.

use crate::assembly::{AssemblyBuilder, Orientation, PartAttributes, PartKind, PartPlacement, SpurAttributes};
use crate::cursor::AxisCursor;
use crate::envelope::Envelope;
use crate::error::LayoutResult;
use crate::resolver::{ShaftRequest, ShaftSupport};
use crate::spec::Specification;
use crate::zones::ZoneSizes;
use glam::DVec3;
use tracing::debug;

pub const HOUSING_BACK: &str = "housing_back";
pub const HOUSING_FRONT: &str = "housing_front";
pub const GEAR_A: &str = "gear_a";
pub const GEAR_B: &str = "gear_b";
pub const DOG_CLUTCH: &str = "dog_clutch";
pub const SPACER_A: &str = "spacer_a";
pub const SPACER_B: &str = "spacer_b";
pub const MAIN_AXLE: &str = "axle_main";
pub const MAIN_AXIS: &str = "main_axis";

/// Clutch outer diameter as a fraction of the coaxial gear envelope.
const CLUTCH_DIAMETER_RATIO: f64 = 0.5;

/// Reference coordinates the secondary stage is placed against.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PrimaryLayout {
    /// Z of the clutch centre.
    pub clutch_reference: f64,
    /// Outer radius of the clutch, where the lever fork rides.
    pub clutch_radius: f64,
    pub back_housing_center: f64,
    pub front_housing_center: f64,
    /// Back housing outer face to front housing outer face.
    pub total_length: f64,
}

impl PrimaryLayout {
    /// Z of the front housing's inner face, where the conversion zone ends.
    pub fn front_inner_face(&self, housing_thickness: f64) -> f64 {
        self.front_housing_center - housing_thickness / 2.0
    }
}

/// Places the primary-axis parts, queues the main axle and registers the main
/// shaft axis.
pub fn layout_primary(
    builder: &mut AssemblyBuilder,
    spec: &Specification,
    zones: &ZoneSizes,
) -> LayoutResult<PrimaryLayout> {
    let z = &zones.primary;
    let housing_plate = Envelope::Plate {
        half_extents: [
            zones.secondary_offset + zones.bevel.pitch_radius,
            zones.secondary_offset + zones.bevel.pitch_radius,
            z.back_housing.part / 2.0,
        ],
    };
    let gear_disc = Envelope::Disc {
        radius: zones.gear_outer_radius,
        thickness: z.gear_a.part,
    };
    let spacer_disc = Envelope::Disc {
        radius: spec.shaft_diameter,
        thickness: spec.geometry.gear_spacing,
    };
    let spur = PartAttributes::Spur(SpurAttributes {
        teeth: spec.gears.coaxial_teeth,
        pitch_radius: zones.gear_pitch_radius,
        outer_radius: zones.gear_outer_radius,
        face_width: z.gear_a.part,
    });

    let mut cursor = AxisCursor::default();

    let back = cursor.span(z.back_housing.part);
    builder.place(PartPlacement::new(HOUSING_BACK, PartKind::HousingBack, back, housing_plate))?;
    let spacer_b = cursor.span(z.back_housing.gap);
    builder.place(PartPlacement::new(SPACER_B, PartKind::Spacer, spacer_b, spacer_disc))?;

    let gear_b = cursor.span(z.gear_b.part);
    builder.place(
        PartPlacement::new(GEAR_B, PartKind::CoaxialGearB, gear_b, gear_disc)
            .with_attributes(spur.clone()),
    )?;
    cursor.advance(z.gear_b.gap);

    let clutch_radius = zones.gear_outer_radius * CLUTCH_DIAMETER_RATIO;
    let clutch = cursor.span(z.clutch.part);
    builder.place(PartPlacement::new(
        DOG_CLUTCH,
        PartKind::DogClutch,
        clutch,
        Envelope::Disc {
            radius: clutch_radius,
            thickness: z.clutch.part,
        },
    ))?;
    cursor.advance(z.clutch.gap);

    let gear_a = cursor.span(z.gear_a.part);
    builder.place(
        PartPlacement::new(GEAR_A, PartKind::CoaxialGearA, gear_a, gear_disc).with_attributes(spur),
    )?;
    let spacer_a = cursor.span(z.gear_a.gap);
    builder.place(PartPlacement::new(SPACER_A, PartKind::Spacer, spacer_a, spacer_disc))?;

    // Nothing on the main axis occupies the conversion zone, but the bevel pair
    // beside it needs the housings this far apart.
    cursor.advance(zones.bevel.zone_length);

    let front = cursor.span(z.front_housing.part);
    builder.place(PartPlacement::new(HOUSING_FRONT, PartKind::HousingFront, front, housing_plate))?;
    cursor.advance(z.front_housing.gap);

    let layout = PrimaryLayout {
        clutch_reference: clutch.z,
        clutch_radius,
        back_housing_center: back.z,
        front_housing_center: front.z,
        total_length: cursor.coordinate(),
    };

    builder.request_shaft(ShaftRequest {
        id: MAIN_AXLE.to_string(),
        kind: PartKind::MainAxle,
        bearing: DVec3::ZERO,
        orientation: Orientation::IDENTITY,
        diameter: spec.shaft_diameter,
        support: ShaftSupport::Mated,
    })?;
    let stack = [HOUSING_BACK, SPACER_B, GEAR_B, DOG_CLUTCH, GEAR_A, SPACER_A, HOUSING_FRONT];
    let clearance = spec.tolerances.shaft_clearance;
    let mates = builder.mates_mut();
    for part in stack {
        mates.shaft_fit(MAIN_AXLE, part, clearance);
    }
    mates.abutment(SPACER_B, HOUSING_BACK);
    mates.abutment(SPACER_B, GEAR_B);
    mates.abutment(SPACER_A, GEAR_A);
    mates.dog_engagement(DOG_CLUTCH, GEAR_A);
    mates.dog_engagement(DOG_CLUTCH, GEAR_B);

    let mut members = stack.to_vec();
    members.push(MAIN_AXLE);
    builder.add_shaft_axis(MAIN_AXIS, DVec3::ZERO, DVec3::Z, &members)?;

    debug!(
        clutch_reference = layout.clutch_reference,
        total_length = layout.total_length,
        "Laid out primary axis"
    );

    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{DogClutchSpec, FlexureSpec, GearSpec, GeometrySpec, ToleranceSpec};
    use approx::assert_relative_eq;

    fn spec() -> Specification {
        Specification {
            name: "mux".to_string(),
            shaft_diameter: 6.0,
            gears: GearSpec {
                module: 1.5,
                pressure_angle: 20.0,
                coaxial_teeth: 24,
                bevel_teeth: 16,
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

    fn solve() -> (AssemblyBuilder, PrimaryLayout) {
        let spec = spec();
        let zones = ZoneSizes::from_spec(&spec).unwrap();
        let mut builder = AssemblyBuilder::new("mux");
        let layout = layout_primary(&mut builder, &spec, &zones).unwrap();
        (builder, layout)
    }

    #[test]
    fn parts_are_stacked_back_to_front() {
        let (builder, layout) = solve();
        let z = |id: &str| builder.part(id).unwrap().origin.z;

        assert_relative_eq!(z(HOUSING_BACK), 2.0);
        assert_relative_eq!(z(SPACER_B), 5.5);
        assert_relative_eq!(z(GEAR_B), 11.0);
        assert_relative_eq!(z(DOG_CLUTCH), 23.0);
        assert_relative_eq!(z(GEAR_A), 35.0);
        assert_relative_eq!(z(SPACER_A), 40.5);
        assert_relative_eq!(z(HOUSING_FRONT), 64.75);
        assert_relative_eq!(layout.clutch_reference, 23.0);
    }

    #[test]
    fn total_length_is_zone_sum_plus_bevel_zone() {
        let spec = spec();
        let zones = ZoneSizes::from_spec(&spec).unwrap();
        let (_, layout) = solve();
        assert_relative_eq!(
            layout.total_length,
            zones.primary.total() + zones.bevel.zone_length
        );
        assert_relative_eq!(layout.total_length, 66.75);
    }

    #[test]
    fn main_axle_waits_for_the_resolver() {
        let (builder, _) = solve();
        assert!(builder.part(MAIN_AXLE).is_none());
        assert_eq!(builder.mates().mates_of(MAIN_AXLE).count(), 7);
    }

    #[test]
    fn clutch_gaps_stay_open_for_shift_travel() {
        let (builder, layout) = solve();
        let mates = builder.mates();
        assert!(mates.are_mated(DOG_CLUTCH, GEAR_A));
        assert!(mates.are_mated(DOG_CLUTCH, GEAR_B));
        assert!(!mates.are_mated(SPACER_A, DOG_CLUTCH));
        assert!(!mates.are_mated(SPACER_B, DOG_CLUTCH));

        // Both spacers sit outside the gear pair.
        let z = |id: &str| builder.part(id).unwrap().origin.z;
        assert!(z(SPACER_B) < z(GEAR_B));
        assert!(z(SPACER_A) > z(GEAR_A));
        assert_relative_eq!(layout.clutch_radius, 9.0);
    }
}
