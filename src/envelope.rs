//! Nominal solid envelopes of placed parts.
//!
//! The solver never builds real solids. It only needs a coarse envelope per
//! part. The separation check reads its extent in the assembly frame and its
//! nominal thickness; downstream reporting reads its mass estimate.

use bevy_heavy::ComputeMassProperties3d;
use bevy_math::primitives::{Cuboid, Cylinder};
use glam::{DMat3, DQuat, DVec3, Vec3};
use serde::{Deserialize, Serialize};

/// Coarse envelope of a part, expressed in its local frame (axis = local +Z)
/// and centred on [`PartPlacement::envelope_center`](crate::PartPlacement::envelope_center).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Envelope {
    /// A gear, clutch or spacer: a short cylinder of `radius` and `thickness`.
    Disc { radius: f64, thickness: f64 },
    /// A shaft of `diameter` and `length`.
    Rod { diameter: f64, length: f64 },
    /// A plate defined by half-extents; `half_extents.z` is half the thickness.
    Plate { half_extents: [f64; 3] },
}

impl Envelope {
    /// Thickness along the part's own axis. For shafts this is the diameter,
    /// since a shaft crosses other parts sideways.
    pub fn face_width(&self) -> f64 {
        match *self {
            Self::Disc { thickness, .. } => thickness,
            Self::Rod { diameter, .. } => diameter,
            Self::Plate { half_extents } => half_extents[2] * 2.0,
        }
    }

    /// Half extents of the axis-aligned box around the envelope once it is
    /// turned by `rotation`.
    ///
    /// Discs and rods are bounded as cylinders, so a spin about their own axis
    /// leaves the box unchanged.
    pub fn world_half_extents(&self, rotation: DQuat) -> DVec3 {
        match *self {
            Self::Disc { radius, thickness } => {
                cylinder_half_extents(rotation * DVec3::Z, radius, thickness / 2.0)
            }
            Self::Rod { diameter, length } => {
                cylinder_half_extents(rotation * DVec3::Z, diameter / 2.0, length / 2.0)
            }
            Self::Plate { half_extents: [x, y, z] } => {
                let m = DMat3::from_quat(rotation);
                m.x_axis.abs() * x + m.y_axis.abs() * y + m.z_axis.abs() * z
            }
        }
    }

    /// Convert to the corresponding `bevy_math` primitive for mass-property computation.
    pub fn to_bevy_primitive(self) -> EnvelopePrimitive {
        match self {
            Self::Disc { radius, thickness } => {
                EnvelopePrimitive::Cylinder(Cylinder::new(radius as f32, thickness as f32))
            }
            Self::Rod { diameter, length } => {
                EnvelopePrimitive::Cylinder(Cylinder::new((diameter / 2.0) as f32, length as f32))
            }
            Self::Plate { half_extents } => EnvelopePrimitive::Cuboid(Cuboid {
                half_size: Vec3::new(
                    half_extents[0] as f32,
                    half_extents[1] as f32,
                    half_extents[2] as f32,
                ),
            }),
        }
    }

    /// Estimated mass in grams for a material of `density` g/mm³.
    pub fn mass(&self, density: f64) -> f64 {
        f64::from(self.to_bevy_primitive().mass(density as f32))
    }
}

fn cylinder_half_extents(axis: DVec3, radius: f64, half_height: f64) -> DVec3 {
    let sweep = |a: f64| radius * (1.0 - a * a).max(0.0).sqrt();
    axis.abs() * half_height + DVec3::new(sweep(axis.x), sweep(axis.y), sweep(axis.z))
}

/// The `bevy_math` shape an envelope estimates its mass with.
#[derive(Clone, Copy, Debug)]
pub enum EnvelopePrimitive {
    Cuboid(Cuboid),
    Cylinder(Cylinder),
}

impl ComputeMassProperties3d for EnvelopePrimitive {
    fn mass(&self, density: f32) -> f32 {
        match self {
            Self::Cuboid(s) => s.mass(density),
            Self::Cylinder(s) => s.mass(density),
        }
    }

    fn unit_principal_angular_inertia(&self) -> Vec3 {
        match self {
            Self::Cuboid(s) => s.unit_principal_angular_inertia(),
            Self::Cylinder(s) => s.unit_principal_angular_inertia(),
        }
    }

    fn center_of_mass(&self) -> Vec3 {
        match self {
            Self::Cuboid(s) => s.center_of_mass(),
            Self::Cylinder(s) => s.center_of_mass(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn disc_face_width_is_its_thickness() {
        let disc = Envelope::Disc {
            radius: 18.0,
            thickness: 8.0,
        };
        assert_eq!(disc.face_width(), 8.0);
    }

    #[test]
    fn plate_face_width_is_full_thickness() {
        let plate = Envelope::Plate {
            half_extents: [40.0, 40.0, 2.0],
        };
        assert_eq!(plate.face_width(), 4.0);
    }

    #[test]
    fn upright_disc_bounds_are_radius_by_half_thickness() {
        let disc = Envelope::Disc {
            radius: 12.0,
            thickness: 3.75,
        };
        let half = disc.world_half_extents(DQuat::IDENTITY);
        assert!(half.abs_diff_eq(DVec3::new(12.0, 12.0, 1.875), 1e-12));
    }

    #[test]
    fn spinning_a_disc_about_its_axis_keeps_its_bounds() {
        let disc = Envelope::Disc {
            radius: 12.0,
            thickness: 3.75,
        };
        // Axis turned onto -X, then a quarter-tooth spin about it.
        let rotation = DQuat::from_rotation_y(-90f64.to_radians())
            * DQuat::from_rotation_z(11.25f64.to_radians());
        let half = disc.world_half_extents(rotation);
        assert!(half.abs_diff_eq(DVec3::new(1.875, 12.0, 12.0), 1e-9));
    }

    #[test]
    fn turned_plate_swaps_its_extents() {
        let plate = Envelope::Plate {
            half_extents: [2.0, 10.0, 1.0],
        };
        let half = plate.world_half_extents(DQuat::from_rotation_y(90f64.to_radians()));
        assert!(half.abs_diff_eq(DVec3::new(1.0, 10.0, 2.0), 1e-12));
    }

    #[test]
    fn rod_mass_matches_cylinder_volume() {
        let rod = Envelope::Rod {
            diameter: 6.0,
            length: 50.0,
        };
        let expected = PI * 9.0 * 50.0 * 0.00124;
        assert_relative_eq!(rod.mass(0.00124), expected, max_relative = 1e-4);
    }

    #[test]
    fn plate_mass_matches_box_volume() {
        let plate = Envelope::Plate {
            half_extents: [10.0, 5.0, 1.0],
        };
        assert_relative_eq!(plate.mass(1.0), 20.0 * 10.0 * 2.0, max_relative = 1e-4);
    }
}
