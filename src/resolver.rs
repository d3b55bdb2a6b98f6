//! Derived Length Resolver.
//!
//! Shaft lengths are a function of where everything ended up, so they are
//! computed after both layout stages. A shaft starts at its bearing support and
//! must run [`SHAFT_OVERRUN_MM`] past the far face of the farthest part mated to
//! it. The nominal axle length from the specification is only used for shafts
//! that are explicitly free-standing.

use crate::assembly::{
    AssemblyBuilder, Orientation, PartAttributes, PartKind, PartPlacement, ShaftAttributes,
};
use crate::envelope::Envelope;
use crate::error::{LayoutError, LayoutResult, positive};
use crate::mates::MateRegistry;
use crate::zones::SHAFT_OVERRUN_MM;
use glam::DVec3;
use tracing::{debug, warn};

/// Whether a shaft must be sized from its mates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaftSupport {
    /// The shaft carries mated parts; sizing without them is an error.
    Mated,
    /// A standalone shaft; falls back to the nominal axle length.
    Free,
}

/// A shaft waiting for its length.
#[derive(Clone, Debug, PartialEq)]
pub struct ShaftRequest {
    pub id: String,
    pub kind: PartKind,
    /// Bearing support point; the shaft starts here.
    pub bearing: DVec3,
    /// The shaft runs along this orientation's local +Z.
    pub orientation: Orientation,
    pub diameter: f64,
    pub support: ShaftSupport,
}

impl ShaftRequest {
    pub fn axis(&self) -> DVec3 {
        self.orientation.axis()
    }

    fn into_placement(self, length: f64) -> PartPlacement {
        let axis = self.axis();
        PartPlacement::new(
            self.id,
            self.kind,
            self.bearing,
            Envelope::Rod {
                diameter: self.diameter,
                length,
            },
        )
        .with_orientation(self.orientation)
        .with_envelope_center(DVec3::new(0.0, 0.0, length / 2.0))
        .with_attributes(PartAttributes::Shaft(ShaftAttributes {
            axis,
            bearing: self.bearing,
            diameter: self.diameter,
            length,
        }))
    }
}

/// Length `request` needs to carry every part mated to it.
///
/// `lookup` resolves part ids to their final placements.
///
/// # Errors
///
/// - [`LayoutError::UnresolvedMate`] if a [`ShaftSupport::Mated`] shaft has no
///   mates, or a mate names a part `lookup` cannot find.
/// - [`LayoutError::InvalidGeometry`] if every mated part lies behind the
///   bearing, or the nominal fallback is not positive.
pub fn shaft_length<'a>(
    request: &ShaftRequest,
    lookup: impl Fn(&str) -> Option<&'a PartPlacement>,
    mates: &MateRegistry,
    nominal_length: f64,
) -> LayoutResult<f64> {
    let axis = request.axis();
    let mut farthest: Option<f64> = None;

    for mate in mates.mates_of(&request.id) {
        let Some(other) = mate.other(&request.id) else {
            continue;
        };
        let part = lookup(other).ok_or_else(|| LayoutError::UnresolvedMate {
            part: other.to_string(),
        })?;
        let far_face =
            (part.origin - request.bearing).dot(axis) + part.envelope.face_width() / 2.0;
        farthest = Some(farthest.map_or(far_face, |f: f64| f.max(far_face)));
    }

    match (farthest, request.support) {
        (Some(span), _) => {
            if !(span.is_finite() && span > 0.0) {
                return Err(LayoutError::invalid(
                    format!("span of '{}' beyond its bearing", request.id),
                    span,
                ));
            }
            Ok(span + SHAFT_OVERRUN_MM)
        }
        (None, ShaftSupport::Free) => {
            warn!(
                shaft = %request.id,
                nominal_length,
                "No mates for free shaft, using nominal axle length"
            );
            positive("nominal axle length", nominal_length)
        }
        (None, ShaftSupport::Mated) => Err(LayoutError::UnresolvedMate {
            part: request.id.clone(),
        }),
    }
}

/// Turns every queued shaft in `builder` into a placement with its derived length.
pub fn resolve_shafts(builder: &mut AssemblyBuilder, nominal_length: f64) -> LayoutResult<()> {
    for request in builder.take_shafts() {
        let length = shaft_length(&request, |id| builder.part(id), builder.mates(), nominal_length)?;
        debug!(shaft = %request.id, length, "Resolved shaft length");
        builder.place(request.into_placement(length))?;
    }
    Ok(())
}
