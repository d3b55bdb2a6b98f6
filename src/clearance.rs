//! Separation check for parts that are not declared to mate.
//!
//! Each part's envelope is turned into the assembly frame and boxed. Two
//! unmated parts pass when their boxes are apart along at least one assembly
//! axis by half the smaller part's face width.

use crate::assembly::PartPlacement;
use crate::error::{LayoutError, LayoutResult};
use crate::mates::MateRegistry;
use glam::DVec3;

/// Rounding allowance on the clearance comparison, in mm.
pub const SEPARATION_TOLERANCE: f64 = 1e-9;

/// Axis-aligned box around a part's envelope in the assembly frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: DVec3,
    pub max: DVec3,
}

impl Bounds {
    pub fn of(part: &PartPlacement) -> Self {
        let rotation = part.orientation.to_quat();
        let center = part.origin + rotation * part.envelope_center;
        let half = part.envelope.world_half_extents(rotation);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Widest gap between the two boxes along any assembly axis. Negative when
    /// they overlap on all three.
    pub fn gap(&self, other: &Self) -> f64 {
        (other.min - self.max).max(self.min - other.max).max_element()
    }
}

/// Clearance two unmated parts must keep: half the smaller face width.
pub fn required_separation(a: &PartPlacement, b: &PartPlacement) -> f64 {
    a.envelope.face_width().min(b.envelope.face_width()) / 2.0
}

/// Checks every unmated pair, in id order, and reports the first one whose
/// envelopes sit closer than [`required_separation`].
///
/// # Errors
///
/// Returns [`LayoutError::GeometryOverflow`] naming both parts, with the gap
/// actually left as the reserved amount.
pub fn check_separation<'a>(
    parts: impl IntoIterator<Item = &'a PartPlacement>,
    mates: &MateRegistry,
) -> LayoutResult<()> {
    let boxed: Vec<(&PartPlacement, Bounds)> =
        parts.into_iter().map(|p| (p, Bounds::of(p))).collect();
    for (i, (a, a_bounds)) in boxed.iter().enumerate() {
        for (b, b_bounds) in &boxed[i + 1..] {
            if mates.are_mated(&a.id, &b.id) {
                continue;
            }
            let gap = a_bounds.gap(b_bounds);
            let required = required_separation(a, b);
            if gap + SEPARATION_TOLERANCE < required {
                return Err(LayoutError::overflow(
                    format!("separation of '{}' and '{}'", a.id, b.id),
                    required,
                    gap,
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::{Orientation, PartKind};
    use crate::envelope::Envelope;
    use approx::assert_relative_eq;

    fn disc(id: &str, origin: DVec3, thickness: f64) -> PartPlacement {
        PartPlacement::new(
            id,
            PartKind::Spacer,
            origin,
            Envelope::Disc {
                radius: 6.0,
                thickness,
            },
        )
    }

    fn rod_along_x(id: &str, bearing: DVec3, length: f64) -> PartPlacement {
        PartPlacement::new(
            id,
            PartKind::SecondaryAxle,
            bearing,
            Envelope::Rod {
                diameter: 6.0,
                length,
            },
        )
        .with_orientation(Orientation::new(0.0, 90.0, 0.0))
        .with_envelope_center(DVec3::new(0.0, 0.0, length / 2.0))
    }

    #[test]
    fn rod_bounds_start_at_the_bearing() {
        let rod = rod_along_x("axle", DVec3::new(10.0, 33.0, 35.0), 14.0);
        let bounds = Bounds::of(&rod);
        assert!(bounds.min.abs_diff_eq(DVec3::new(10.0, 30.0, 32.0), 1e-9));
        assert!(bounds.max.abs_diff_eq(DVec3::new(24.0, 36.0, 38.0), 1e-9));
    }

    #[test]
    fn gap_is_taken_along_the_separating_axis() {
        let a = Bounds::of(&disc("a", DVec3::ZERO, 8.0));
        let b = Bounds::of(&disc("b", DVec3::new(0.0, 0.0, 7.0), 3.0));
        // a ends at z = 4, b starts at z = 5.5.
        assert_relative_eq!(a.gap(&b), 1.5);
        assert_relative_eq!(b.gap(&a), 1.5);
    }

    #[test]
    fn separated_parts_pass() {
        let parts = [
            disc("a", DVec3::ZERO, 8.0),
            disc("b", DVec3::new(0.0, 0.0, 7.0), 3.0),
        ];
        assert!(check_separation(&parts, &MateRegistry::new()).is_ok());
    }

    #[test]
    fn crowded_parts_overflow() {
        let parts = [
            disc("a", DVec3::ZERO, 8.0),
            disc("b", DVec3::new(0.0, 0.0, 6.0), 3.0),
        ];
        let err = check_separation(&parts, &MateRegistry::new()).unwrap_err();
        assert_eq!(
            err,
            LayoutError::GeometryOverflow {
                zone: "separation of 'a' and 'b'".to_string(),
                required: 1.5,
                reserved: 0.5,
            }
        );
    }

    #[test]
    fn distant_origins_do_not_hide_an_overlap() {
        // Origins 20 mm apart, but the rod runs straight through the disc.
        let parts = [
            rod_along_x("axle", DVec3::new(-20.0, 0.0, 0.0), 40.0),
            disc("spacer", DVec3::ZERO, 3.0),
        ];
        let err = check_separation(&parts, &MateRegistry::new()).unwrap_err();
        assert!(matches!(err, LayoutError::GeometryOverflow { reserved, .. } if reserved < 0.0));
    }

    #[test]
    fn side_by_side_parts_pass_on_lateral_gap() {
        let parts = [
            disc("a", DVec3::ZERO, 8.0),
            disc("b", DVec3::new(14.0, 0.0, 0.0), 3.0),
        ];
        assert!(check_separation(&parts, &MateRegistry::new()).is_ok());
    }

    #[test]
    fn mated_parts_are_exempt() {
        let parts = [
            disc("a", DVec3::ZERO, 8.0),
            disc("b", DVec3::ZERO, 3.0),
        ];
        let mut mates = MateRegistry::new();
        mates.abutment("a", "b");
        assert!(check_separation(&parts, &mates).is_ok());
    }
}
