//! # mechlogic-layout
//!
//! Assembly layout solver for a mechanical 2:1 multiplexer logic element.
//!
//! Given a declarative [`Specification`] (gear modules, tooth counts, housing and
//! flexure dimensions, tolerances) the [`LayoutSolver`] places every part of the
//! element in one right-handed millimetre frame and returns an [`AssemblyModel`]:
//! part placements keyed by id, the mates between them, and the derived global
//! dimensions. The model is plain data that CAD generators, drawing exporters and
//! simulators can consume without knowing how it was solved.
//!
//! Z runs along the primary rotational axis, back housing to front housing. The
//! secondary (selector) shaft sits in the plane offset along Y and runs along X.
//! It joins the primary stage through a 1:1 bevel pair whose driven gear turns
//! the clutch-shifting lever.

pub mod assembly;
pub mod clearance;
pub mod cursor;
pub mod envelope;
pub mod error;
pub mod logic;
pub mod mates;
pub mod primary;
pub mod resolver;
pub mod secondary;
pub mod solver;
pub mod spec;
pub mod zones;

pub use assembly::*;
pub use envelope::Envelope;
pub use error::*;
pub use logic::*;
pub use mates::*;
pub use solver::*;
pub use spec::*;
pub use zones::ZoneSizes;
