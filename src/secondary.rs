//! Secondary Axis & Conversion Layout.
//!
//! Places the right-angle bevel pair that turns the selector input into lever
//! motion, the lever and its pivot, and the compliant mount that carries the
//! secondary shaft. Every coordinate is taken relative to the clutch reference
//! produced by [`layout_primary`](crate::primary::layout_primary); nothing here
//! moves a primary-axis part.
//!
//! Everything on this side lives in the plane `Y = y_s`, the secondary offset.
//! The lever pivot runs parallel to the main axis at `X = 0`, on the clutch's
//! centre-line. The secondary shaft crosses it laterally along +X at the
//! driving gear's plane, one pitch radius in front of the clutch. The driving
//! gear sits one pitch radius out along that shaft, so both bevel gears share
//! one pitch-cone apex on the pivot axis. The driven gear sits `w + 2` behind
//! the clutch, on the pivot.

use crate::assembly::{
    AssemblyBuilder, BevelAttributes, FlexureAttributes, Orientation, PartAttributes, PartKind,
    PartPlacement,
};
use crate::envelope::Envelope;
use crate::error::{LayoutError, LayoutResult, positive};
use crate::primary::{DOG_CLUTCH, HOUSING_BACK, HOUSING_FRONT, PrimaryLayout};
use crate::resolver::{ShaftRequest, ShaftSupport};
use crate::solver::SolverConfig;
use crate::spec::Specification;
use crate::zones::{DRIVEN_GEAR_CLEARANCE_MM, ZoneSizes, conversion_requirement};
use glam::DVec3;
use tracing::debug;

pub const BEVEL_DRIVING: &str = "bevel_driving";
pub const BEVEL_DRIVEN: &str = "bevel_driven";
pub const LEVER: &str = "lever";
pub const LEVER_PIVOT: &str = "lever_pivot";
pub const SECONDARY_AXLE: &str = "axle_secondary";
pub const FLEXURE: &str = "flexure_mount";
pub const SECONDARY_AXIS: &str = "secondary_axis";
pub const PIVOT_AXIS: &str = "pivot_axis";

/// Secondary axle runs along +X, away from the shared apex.
const SECONDARY_AXLE_ORIENTATION: Orientation = Orientation::new(0.0, 90.0, 0.0);
/// Lever swings about the line joining its pivot and the clutch.
const LEVER_ORIENTATION: Orientation = Orientation::new(0.0, 90.0, 0.0);
/// Mount on the front housing extends back toward −Z.
const FRONT_MOUNT_ORIENTATION: Orientation = Orientation::new(0.0, 180.0, 0.0);

/// Driving gear axis along −X, teeth facing the pivot axis, turned half a
/// tooth pitch about its own axis so its teeth fall between the driven gear's.
pub fn driving_orientation(teeth: u32) -> Orientation {
    Orientation::new(0.0, -90.0, 180.0 / f64::from(teeth))
}

/// Coordinates fixed by the secondary stage.
#[derive(Clone, Debug, PartialEq)]
pub struct SecondaryLayout {
    /// Z of the driving gear plane and the secondary shaft.
    pub driving_plane: f64,
    /// Z of the driven gear's back face.
    pub driven_plane: f64,
    /// Lateral Y of the pivot axis and the secondary shaft.
    pub pivot_line: f64,
    /// Shared pitch-cone apex of the bevel pair.
    pub apex: DVec3,
    /// Housing the compliant mount is fixed to.
    pub mount_housing: &'static str,
}

/// Places the conversion stage and queues the secondary axle and lever pivot.
///
/// # Errors
///
/// - [`LayoutError::GeometryOverflow`] if the pair, lever and deflection pocket
///   need more than the reserved conversion zone, or if the driving gear
///   reaches the front housing.
/// - [`LayoutError::InvalidGeometry`] if the pair's apexes and axes do not line
///   up, or the lever would have no length.
pub fn layout_secondary(
    builder: &mut AssemblyBuilder,
    spec: &Specification,
    zones: &ZoneSizes,
    primary: &PrimaryLayout,
    config: &SolverConfig,
) -> LayoutResult<SecondaryLayout> {
    let bevel = zones.bevel;
    let r = bevel.pitch_radius;
    let w = bevel.face_width;
    let z_c = primary.clutch_reference;
    let y_s = zones.secondary_offset;
    let h = spec.geometry.housing_thickness;

    let required = conversion_requirement(spec, &bevel);
    if required > bevel.zone_length {
        return Err(LayoutError::overflow(
            "bevel conversion zone",
            required,
            bevel.zone_length,
        ));
    }

    let driving_plane = z_c + r;
    let room = primary.front_inner_face(h) - z_c;
    if 2.0 * r > room {
        return Err(LayoutError::overflow(
            "driving bevel clearance to front housing",
            2.0 * r,
            room,
        ));
    }

    let gear_disc = Envelope::Disc {
        radius: r,
        thickness: w,
    };
    let teeth = spec.gears.bevel_teeth;

    let driving_origin = DVec3::new(r, y_s, driving_plane);
    let driving = PartPlacement::new(
        BEVEL_DRIVING,
        PartKind::BevelDriveGear,
        driving_origin,
        gear_disc,
    )
    .with_orientation(driving_orientation(teeth))
    .with_attributes(PartAttributes::Bevel(BevelAttributes::new(teeth, r, w, r)));

    let driven_plane = z_c - (w + DRIVEN_GEAR_CLEARANCE_MM);
    let driven_apex_distance = positive("driven bevel apex distance", driving_plane - driven_plane)?;
    let driven = PartPlacement::new(
        BEVEL_DRIVEN,
        PartKind::BevelDrivenGear,
        DVec3::new(0.0, y_s, driven_plane),
        gear_disc,
    )
    .with_attributes(PartAttributes::Bevel(BevelAttributes::new(
        teeth,
        r,
        w,
        driven_apex_distance,
    )));

    let apex = check_bevel_pair(&driving, &driven, config.apex_tolerance)?;
    builder.place(driving)?;
    builder.place(driven)?;

    // Starts flush with the driving gear's apex-side face and runs outward.
    let axle_bearing = driving_origin - DVec3::X * (w / 2.0);
    builder.request_shaft(ShaftRequest {
        id: SECONDARY_AXLE.to_string(),
        kind: PartKind::SecondaryAxle,
        bearing: axle_bearing,
        orientation: SECONDARY_AXLE_ORIENTATION,
        diameter: spec.shaft_diameter,
        support: ShaftSupport::Mated,
    })?;

    // A stub pressed into the back housing's inner face.
    let pivot_bearing = DVec3::new(0.0, y_s, primary.back_housing_center + h / 2.0);
    builder.request_shaft(ShaftRequest {
        id: LEVER_PIVOT.to_string(),
        kind: PartKind::LeverPivot,
        bearing: pivot_bearing,
        orientation: Orientation::IDENTITY,
        diameter: spec.shaft_diameter,
        support: ShaftSupport::Mated,
    })?;

    // Runs from the pivot axis down to the clutch's shift groove.
    let lever_length = positive("lever length", y_s - primary.clutch_radius)?;
    let t = config.lever_thickness;
    builder.place(
        PartPlacement::new(
            LEVER,
            PartKind::Lever,
            DVec3::new(0.0, y_s, z_c),
            Envelope::Plate {
                half_extents: [t / 2.0, lever_length / 2.0, t / 2.0],
            },
        )
        .with_orientation(LEVER_ORIENTATION)
        .with_envelope_center(DVec3::new(0.0, -lever_length / 2.0, 0.0)),
    )?;

    let mount_housing = nearest_housing(primary, driving_plane);
    builder.place(compliant_mount(spec, primary, mount_housing, DVec3::new(r, y_s, 0.0)))?;

    let tol = &spec.tolerances;
    let mates = builder.mates_mut();
    mates.shaft_fit(SECONDARY_AXLE, BEVEL_DRIVING, tol.shaft_clearance);
    mates.gear_mesh(BEVEL_DRIVING, BEVEL_DRIVEN, tol.gear_backlash);
    mates.shaft_fit(LEVER_PIVOT, BEVEL_DRIVEN, tol.shaft_clearance);
    mates.pivot(LEVER_PIVOT, LEVER, tol.shaft_clearance);
    mates.fork_groove(DOG_CLUTCH, LEVER, config.fork_groove_clearance);
    mates.press_fit(LEVER_PIVOT, HOUSING_BACK, tol.press_fit_interference);
    mates.abutment(FLEXURE, mount_housing);

    builder.add_shaft_axis(SECONDARY_AXIS, apex, DVec3::X, &[BEVEL_DRIVING, SECONDARY_AXLE])?;
    builder.add_shaft_axis(
        PIVOT_AXIS,
        DVec3::new(0.0, y_s, 0.0),
        DVec3::Z,
        &[LEVER_PIVOT, BEVEL_DRIVEN, LEVER],
    )?;

    debug!(
        driving_plane,
        driven_plane,
        pivot_line = y_s,
        apex = ?apex,
        mount_housing,
        "Laid out secondary axis"
    );

    Ok(SecondaryLayout {
        driving_plane,
        driven_plane,
        pivot_line: y_s,
        apex,
        mount_housing,
    })
}

/// Checks that the pair meets at one apex with perpendicular axes.
fn check_bevel_pair(
    driving: &PartPlacement,
    driven: &PartPlacement,
    tolerance: f64,
) -> LayoutResult<DVec3> {
    let (Some(apex), Some(other)) = (driving.bevel_apex(), driven.bevel_apex()) else {
        return Err(LayoutError::invalid("bevel apex", f64::NAN));
    };
    let mismatch = apex.distance(other);
    if !(mismatch <= tolerance) {
        return Err(LayoutError::invalid("bevel apex mismatch", mismatch));
    }
    let skew = driving.orientation.axis().dot(driven.orientation.axis());
    if !(skew.abs() <= tolerance) {
        return Err(LayoutError::invalid("bevel axis angle cosine", skew));
    }
    Ok(apex)
}

/// The housing whose centre is closest to `plane`. Ties go to the front.
fn nearest_housing(primary: &PrimaryLayout, plane: f64) -> &'static str {
    let to_back = (plane - primary.back_housing_center).abs();
    let to_front = (primary.front_housing_center - plane).abs();
    if to_back < to_front {
        HOUSING_BACK
    } else {
        HOUSING_FRONT
    }
}

/// The mount sits on the housing's outer face, its plate outside the housing,
/// with the beam extending into the element. `lateral` supplies X and Y.
fn compliant_mount(
    spec: &Specification,
    primary: &PrimaryLayout,
    housing: &'static str,
    lateral: DVec3,
) -> PartPlacement {
    let half = spec.geometry.housing_thickness / 2.0;
    let (face, orientation) = if housing == HOUSING_BACK {
        (primary.back_housing_center - half, Orientation::IDENTITY)
    } else {
        (primary.front_housing_center + half, FRONT_MOUNT_ORIENTATION)
    };
    let f = &spec.flexure;

    PartPlacement::new(
        FLEXURE,
        PartKind::CompliantMount,
        DVec3::new(lateral.x, lateral.y, face),
        Envelope::Plate {
            half_extents: [f.length / 2.0, f.length / 2.0, f.thickness / 2.0],
        },
    )
    .with_orientation(orientation)
    .with_envelope_center(DVec3::new(0.0, 0.0, -f.thickness / 2.0))
    .with_attributes(PartAttributes::Flexure(FlexureAttributes {
        extension: orientation.axis(),
        housing: housing.to_string(),
        beam_length: f.length,
        beam_thickness: f.thickness,
        max_deflection: f.max_deflection,
    }))
}
