use crate::envelope::Envelope;
use crate::error::{LayoutError, LayoutResult};
use crate::mates::{Mate, MateRegistry};
use crate::resolver::ShaftRequest;
use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The mechanical role of a placed part. This set is closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartKind {
    HousingFront,
    HousingBack,
    CoaxialGearA,
    CoaxialGearB,
    DogClutch,
    Lever,
    LeverPivot,
    MainAxle,
    SecondaryAxle,
    BevelDriveGear,
    BevelDrivenGear,
    CompliantMount,
    Spacer,
}

impl PartKind {
    /// Shaft-like kinds get their length from the Derived Length Resolver.
    pub fn is_shaft(self) -> bool {
        matches!(self, Self::MainAxle | Self::SecondaryAxle | Self::LeverPivot)
    }

    /// Parts whose axis is the primary rotational axis.
    pub fn is_primary_axis(self) -> bool {
        matches!(
            self,
            Self::HousingFront
                | Self::HousingBack
                | Self::CoaxialGearA
                | Self::CoaxialGearB
                | Self::DogClutch
                | Self::Spacer
        )
    }

    /// Whether `attributes` is the attribute set this kind carries.
    pub fn accepts(self, attributes: &PartAttributes) -> bool {
        match attributes {
            PartAttributes::Plain => matches!(
                self,
                Self::HousingFront
                    | Self::HousingBack
                    | Self::DogClutch
                    | Self::Lever
                    | Self::Spacer
            ),
            PartAttributes::Spur(_) => matches!(self, Self::CoaxialGearA | Self::CoaxialGearB),
            PartAttributes::Bevel(_) => {
                matches!(self, Self::BevelDriveGear | Self::BevelDrivenGear)
            }
            PartAttributes::Shaft(_) => self.is_shaft(),
            PartAttributes::Flexure(_) => self == Self::CompliantMount,
        }
    }
}

/// Orientation as three axis-aligned rotations in degrees.
///
/// Applied as `Rx(x) * Ry(y) * Rz(z)`: rotate about X, then about the rotated Y,
/// then about the twice-rotated Z. Every consumer of the layout relies on this
/// order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Orientation {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn to_quat(self) -> DQuat {
        DQuat::from_rotation_x(self.x.to_radians())
            * DQuat::from_rotation_y(self.y.to_radians())
            * DQuat::from_rotation_z(self.z.to_radians())
    }

    /// The part's local +Z axis in the assembly frame.
    pub fn axis(self) -> DVec3 {
        self.to_quat() * DVec3::Z
    }
}

/// Per-kind derived attributes. Only shaft-like kinds carry a length.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PartAttributes {
    Plain,
    Spur(SpurAttributes),
    Bevel(BevelAttributes),
    Shaft(ShaftAttributes),
    Flexure(FlexureAttributes),
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpurAttributes {
    pub teeth: u32,
    pub pitch_radius: f64,
    pub outer_radius: f64,
    pub face_width: f64,
}

/// A bevel gear of the 1:1 pair.
///
/// The pitch-cone apex lies `apex_distance` along the gear's local +Z axis from
/// its origin, the centre of its back face. Both gears share the pitch radius,
/// so the pitch-cone half-angle follows from `apex_distance` alone: 45° for the
/// driving gear, whose apex is one pitch radius away, and whatever the driven
/// gear's longitudinal offset leaves for it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BevelAttributes {
    pub teeth: u32,
    pub pitch_radius: f64,
    pub face_width: f64,
    pub apex_distance: f64,
    /// Pitch-cone half-angle, degrees.
    pub cone_angle: f64,
}

impl BevelAttributes {
    pub fn new(teeth: u32, pitch_radius: f64, face_width: f64, apex_distance: f64) -> Self {
        Self {
            teeth,
            pitch_radius,
            face_width,
            apex_distance,
            cone_angle: pitch_radius.atan2(apex_distance).to_degrees(),
        }
    }
}

/// Span of a resolved shaft. The shaft starts at its bearing and runs `length`
/// along `axis`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShaftAttributes {
    /// Unit direction the shaft runs in, from its bearing.
    pub axis: DVec3,
    /// Bearing support point.
    pub bearing: DVec3,
    pub diameter: f64,
    /// Derived length.
    pub length: f64,
}

/// The compliant mount and the housing it is fixed to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlexureAttributes {
    /// Unit direction the beam and shaft-support boss extend in.
    pub extension: DVec3,
    /// Id of the housing the mount sits against.
    pub housing: String,
    pub beam_length: f64,
    pub beam_thickness: f64,
    /// Clearance reserved for the deflected state.
    pub max_deflection: f64,
}

/// Position, orientation and derived data of one part in the assembly frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PartPlacement {
    pub id: String,
    pub kind: PartKind,
    /// Origin in millimetres.
    pub origin: DVec3,
    pub orientation: Orientation,
    pub envelope: Envelope,
    /// Centre of the envelope in the part's local frame. Zero unless the origin
    /// is an end or a face of the part rather than its middle.
    pub envelope_center: DVec3,
    pub attributes: PartAttributes,
}

impl PartPlacement {
    /// Creates a placement with identity orientation and no derived attributes.
    pub fn new(id: impl Into<String>, kind: PartKind, origin: DVec3, envelope: Envelope) -> Self {
        Self {
            id: id.into(),
            kind,
            origin,
            orientation: Orientation::IDENTITY,
            envelope,
            envelope_center: DVec3::ZERO,
            attributes: PartAttributes::Plain,
        }
    }

    pub fn with_envelope_center(mut self, center: DVec3) -> Self {
        self.envelope_center = center;
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_attributes(mut self, attributes: PartAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Pitch-cone apex, for bevel gears only.
    pub fn bevel_apex(&self) -> Option<DVec3> {
        match &self.attributes {
            PartAttributes::Bevel(b) => {
                Some(self.origin + self.orientation.to_quat() * DVec3::new(0.0, 0.0, b.apex_distance))
            }
            _ => None,
        }
    }

    /// Derived length, for shafts only.
    pub fn shaft_length(&self) -> Option<f64> {
        match &self.attributes {
            PartAttributes::Shaft(s) => Some(s.length),
            _ => None,
        }
    }
}

/// Global dimensions derived during the solve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedDimensions {
    /// Total span of the primary axis, back housing outer face to front housing outer face.
    pub primary_length: f64,
    /// Lateral distance from the primary axis to the secondary shaft.
    pub secondary_offset: f64,
    /// Longitudinal coordinate of the clutch centre.
    pub clutch_reference: f64,
    pub gear_pair_zone: f64,
    pub bevel_zone: f64,
    /// Axial travel of the dog clutch from neutral to full engagement.
    pub clutch_travel: f64,
}

/// Largest distance a member's origin may sit from its shaft axis, in mm.
pub const AXIS_TOLERANCE: f64 = 1e-6;

/// A named rotation axis and the parts that turn on or slide along it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShaftAxis {
    pub name: String,
    /// A point on the axis.
    pub origin: DVec3,
    /// Unit direction.
    pub direction: DVec3,
    /// Member ids in declaration order.
    pub parts: Vec<String>,
}

impl ShaftAxis {
    /// Distance from `point` to the axis line.
    pub fn offset_of(&self, point: DVec3) -> f64 {
        let rel = point - self.origin;
        rel.reject_from_normalized(self.direction).length()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.parts.iter().any(|p| p == id)
    }
}

/// The complete, immutable result of a solve.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssemblyModel {
    name: String,
    parts: BTreeMap<String, PartPlacement>,
    mates: Vec<Mate>,
    shaft_axes: Vec<ShaftAxis>,
    dimensions: DerivedDimensions,
}

impl AssemblyModel {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn part(&self, id: &str) -> Option<&PartPlacement> {
        self.parts.get(id)
    }

    /// All placements, ordered by id.
    pub fn parts(&self) -> impl Iterator<Item = &PartPlacement> {
        self.parts.values()
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn parts_of_kind(&self, kind: PartKind) -> impl Iterator<Item = &PartPlacement> {
        self.parts.values().filter(move |p| p.kind == kind)
    }

    /// Mates in declaration order.
    pub fn mates(&self) -> &[Mate] {
        &self.mates
    }

    /// Shaft axes in declaration order.
    pub fn shaft_axes(&self) -> &[ShaftAxis] {
        &self.shaft_axes
    }

    pub fn shaft_axis(&self, name: &str) -> Option<&ShaftAxis> {
        self.shaft_axes.iter().find(|a| a.name == name)
    }

    pub fn dimensions(&self) -> &DerivedDimensions {
        &self.dimensions
    }

    pub fn bevel_apex(&self, id: &str) -> Option<DVec3> {
        self.part(id).and_then(PartPlacement::bevel_apex)
    }

    /// Sum of the envelope mass estimates, in grams for `density` in g/mm³.
    pub fn estimated_mass(&self, density: f64) -> f64 {
        self.parts.values().map(|p| p.envelope.mass(density)).sum()
    }
}

/// The assembly under construction, threaded through the solving stages.
///
/// Placements, mates and shaft axes accumulate here; shafts wait as
/// [`ShaftRequest`]s until the resolver turns them into placements with a
/// derived length.
#[derive(Debug)]
pub struct AssemblyBuilder {
    name: String,
    parts: BTreeMap<String, PartPlacement>,
    pub(crate) mates: MateRegistry,
    pub(crate) shafts: Vec<ShaftRequest>,
    shaft_axes: Vec<ShaftAxis>,
}

impl AssemblyBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parts: BTreeMap::new(),
            mates: MateRegistry::new(),
            shafts: Vec::new(),
            shaft_axes: Vec::new(),
        }
    }

    fn is_taken(&self, id: &str) -> bool {
        self.parts.contains_key(id) || self.shafts.iter().any(|s| s.id == id)
    }

    /// Adds a placement.
    ///
    /// # Errors
    ///
    /// - [`LayoutError::DuplicatePart`] if the id is already taken.
    /// - [`LayoutError::MismatchedAttributes`] if the attributes belong to
    ///   another part kind.
    /// - [`LayoutError::InvalidGeometry`] if the origin is not finite.
    pub fn place(&mut self, placement: PartPlacement) -> LayoutResult<()> {
        if self.is_taken(&placement.id) {
            return Err(LayoutError::DuplicatePart { part: placement.id });
        }
        if !placement.kind.accepts(&placement.attributes) {
            return Err(LayoutError::MismatchedAttributes {
                part: placement.id,
                kind: placement.kind,
            });
        }
        let origin = placement.origin;
        if let Some(bad) = [origin.x, origin.y, origin.z].into_iter().find(|v| !v.is_finite()) {
            return Err(LayoutError::invalid(format!("origin of '{}'", placement.id), bad));
        }
        self.parts.insert(placement.id.clone(), placement);
        Ok(())
    }

    /// Queues a shaft for the resolver.
    pub fn request_shaft(&mut self, request: ShaftRequest) -> LayoutResult<()> {
        if self.is_taken(&request.id) {
            return Err(LayoutError::DuplicatePart { part: request.id });
        }
        self.shafts.push(request);
        Ok(())
    }

    /// Registers a rotation axis through `origin` along `direction`.
    ///
    /// Members are checked against the axis when the builder is finished, so a
    /// shaft may be named before the resolver has placed it.
    pub fn add_shaft_axis(
        &mut self,
        name: &str,
        origin: DVec3,
        direction: DVec3,
        parts: &[&str],
    ) -> LayoutResult<()> {
        let direction = direction.normalize_or_zero();
        if direction == DVec3::ZERO {
            return Err(LayoutError::invalid(
                format!("direction of shaft axis '{name}'"),
                0.0,
            ));
        }
        self.shaft_axes.push(ShaftAxis {
            name: name.to_string(),
            origin,
            direction,
            parts: parts.iter().map(|p| p.to_string()).collect(),
        });
        Ok(())
    }

    pub fn part(&self, id: &str) -> Option<&PartPlacement> {
        self.parts.get(id)
    }

    pub fn parts(&self) -> impl Iterator<Item = &PartPlacement> {
        self.parts.values()
    }

    pub fn mates(&self) -> &MateRegistry {
        &self.mates
    }

    pub fn mates_mut(&mut self) -> &mut MateRegistry {
        &mut self.mates
    }

    pub(crate) fn take_shafts(&mut self) -> Vec<ShaftRequest> {
        std::mem::take(&mut self.shafts)
    }

    /// Seals the builder into an [`AssemblyModel`].
    ///
    /// # Errors
    ///
    /// - [`LayoutError::UnresolvedMate`] if a shaft was never resolved, or a mate
    ///   or shaft axis names a part that was never placed.
    /// - [`LayoutError::InvalidGeometry`] if a shaft-axis member's origin is off
    ///   its axis.
    pub fn finish(self, dimensions: DerivedDimensions) -> LayoutResult<AssemblyModel> {
        if let Some(pending) = self.shafts.first() {
            return Err(LayoutError::UnresolvedMate {
                part: pending.id.clone(),
            });
        }
        for mate in self.mates.iter() {
            for id in [&mate.part_a, &mate.part_b] {
                if !self.parts.contains_key(id) {
                    return Err(LayoutError::UnresolvedMate { part: id.clone() });
                }
            }
        }
        for axis in &self.shaft_axes {
            for id in &axis.parts {
                let part = self
                    .parts
                    .get(id)
                    .ok_or_else(|| LayoutError::UnresolvedMate { part: id.clone() })?;
                let offset = axis.offset_of(part.origin);
                if offset > AXIS_TOLERANCE {
                    return Err(LayoutError::invalid(
                        format!("offset of '{id}' from shaft axis '{}'", axis.name),
                        offset,
                    ));
                }
            }
        }

        Ok(AssemblyModel {
            name: self.name,
            parts: self.parts,
            mates: self.mates.into_vec(),
            shaft_axes: self.shaft_axes,
            dimensions,
        })
    }
}
