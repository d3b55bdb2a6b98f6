//! Error taxonomy for a layout solve.
//!
//! Every variant is fatal to the solve that produced it: the solver never hands
//! back a partially placed [`AssemblyModel`](crate::AssemblyModel). Each variant
//! carries the quantity that failed and the numbers involved so the caller can
//! correct the specification. [`LayoutError::DuplicatePart`] and
//! [`LayoutError::MismatchedAttributes`] are raised by the
//! [`AssemblyBuilder`](crate::AssemblyBuilder) and point at stage code, not at
//! the specification.

use crate::assembly::PartKind;
use thiserror::Error;

/// Result type for layout operations.
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Errors that can occur while solving an assembly layout.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// A zone or offset computation produced a non-positive, non-finite or
    /// otherwise physically meaningless value (e.g. zero bevel teeth).
    #[error("invalid geometry: {quantity} = {value} mm")]
    InvalidGeometry {
        /// Name of the offending quantity.
        quantity: String,
        /// The value that was computed.
        value: f64,
    },

    /// Reserved space is smaller than what a later stage has to place in it.
    #[error("geometry overflow in {zone}: requires {required} mm but only {reserved} mm reserved")]
    GeometryOverflow {
        /// The zone or clearance that overflowed.
        zone: String,
        /// Space the placement needs.
        required: f64,
        /// Space that was actually reserved.
        reserved: f64,
    },

    /// A part needs mate information that the registry cannot provide.
    #[error("unresolved mate: no mate information for part '{part}'")]
    UnresolvedMate {
        /// The part that could not be resolved.
        part: String,
    },

    /// A part was placed under an id that is already taken.
    #[error("duplicate part id '{part}'")]
    DuplicatePart {
        /// The id placed twice.
        part: String,
    },

    /// A placement carries attributes that belong to another part kind.
    #[error("attributes of part '{part}' do not belong to {kind:?}")]
    MismatchedAttributes {
        /// The offending placement.
        part: String,
        /// The kind it was placed as.
        kind: PartKind,
    },
}

impl LayoutError {
    pub(crate) fn invalid(quantity: impl Into<String>, value: f64) -> Self {
        Self::InvalidGeometry {
            quantity: quantity.into(),
            value,
        }
    }

    pub(crate) fn overflow(zone: impl Into<String>, required: f64, reserved: f64) -> Self {
        Self::GeometryOverflow {
            zone: zone.into(),
            required,
            reserved,
        }
    }
}

/// Rejects non-positive and non-finite values instead of clamping them.
pub(crate) fn positive(quantity: &str, value: f64) -> LayoutResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(LayoutError::invalid(quantity, value))
    }
}
