//! The solver that turns a [`Specification`] into an [`AssemblyModel`].
//!
//! The entry point is [`LayoutSolver`]. Configure it with a [`SolverConfig`] and
//! call [`LayoutSolver::solve`]. A solve runs the stages in a fixed order:
//!
//! 1. [Zone Sizing](crate::zones): every derived constant, once.
//! 2. [Primary Axis Layout](crate::primary): housings, gears, clutch, spacers.
//! 3. [Secondary Axis & Conversion Layout](crate::secondary): bevel pair, lever,
//!    compliant mount.
//! 4. [Derived Length Resolver](crate::resolver): shaft lengths from the mates.
//! 5. [Separation check](crate::clearance) of the envelopes of every unmated
//!    pair.
//!
//! Any failure aborts the solve; no partial model is returned.

use crate::assembly::{AssemblyBuilder, AssemblyModel, DerivedDimensions};
use crate::clearance::check_separation;
use crate::error::LayoutResult;
use crate::primary::layout_primary;
use crate::resolver::resolve_shafts;
use crate::secondary::layout_secondary;
use crate::spec::Specification;
use crate::zones::ZoneSizes;
use tracing::{debug, info};

/// Configuration for layout solving.
#[derive(Clone, Debug, PartialEq)]
pub struct SolverConfig {
    /// Thickness of the shift lever plate, in mm.
    pub lever_thickness: f64,
    /// Clearance between the lever fork and the clutch shift groove, in mm.
    pub fork_groove_clearance: f64,
    /// Density (g/mm³) for the mass estimate. Default: PLA.
    pub material_density: f64,
    /// Largest distance allowed between the two bevel apexes, in mm.
    pub apex_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            lever_thickness: 4.0,
            fork_groove_clearance: 0.5,
            material_density: 0.00124,
            apex_tolerance: 1e-6,
        }
    }
}

/// Solves assembly layouts. Holds no state between solves.
#[derive(Clone, Debug, Default)]
pub struct LayoutSolver {
    config: SolverConfig,
}

impl LayoutSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Places every part of `spec`, resolves shaft lengths and declares the mates.
    ///
    /// The same specification always yields an equal model.
    ///
    /// # Errors
    ///
    /// Returns the first [`LayoutError`](crate::LayoutError) any stage raises.
    pub fn solve(&self, spec: &Specification) -> LayoutResult<AssemblyModel> {
        info!(element = %spec.name, "Solving assembly layout");

        let zones = ZoneSizes::from_spec(spec)?;
        debug!(
            gear_pair_zone = zones.gear_pair_zone,
            bevel_zone = zones.bevel.zone_length,
            secondary_offset = zones.secondary_offset,
            clutch_travel = zones.clutch_travel,
            "Sized zones"
        );

        let mut builder = AssemblyBuilder::new(spec.name.clone());
        let primary = layout_primary(&mut builder, spec, &zones)?;
        layout_secondary(&mut builder, spec, &zones, &primary, &self.config)?;
        resolve_shafts(&mut builder, spec.geometry.axle_length)?;
        check_separation(builder.parts(), builder.mates())?;
        // Shaft axes are checked in `finish`, once every shaft is placed.

        let model = builder.finish(DerivedDimensions {
            primary_length: primary.total_length,
            secondary_offset: zones.secondary_offset,
            clutch_reference: primary.clutch_reference,
            gear_pair_zone: zones.gear_pair_zone,
            bevel_zone: zones.bevel.zone_length,
            clutch_travel: zones.clutch_travel,
        })?;

        info!(
            element = %model.name(),
            primary_length = model.dimensions().primary_length,
            parts = model.part_count(),
            mates = model.mates().len(),
            mass_g = model.estimated_mass(self.config.material_density),
            "Solved assembly layout"
        );

        Ok(model)
    }
}
