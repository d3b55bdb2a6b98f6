// tests/common/mod.rs
#![allow(dead_code)]

use mechlogic_layout::{
    AssemblyModel, DogClutchSpec, FlexureSpec, GearSpec, GeometrySpec, LayoutResult, LayoutSolver,
    Specification, ToleranceSpec,
};

/// Module 1.5, 24-tooth coaxial gears, 16-tooth bevel pair.
pub fn reference_spec() -> Specification {
    Specification {
        name: "mux_reference".to_string(),
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

/// Module 1, 14-tooth bevel pair on 5 mm shafts: the driving plane sits closer
/// to the back housing.
pub fn compact_spec() -> Specification {
    let mut spec = reference_spec();
    spec.name = "mux_compact".to_string();
    spec.shaft_diameter = 5.0;
    spec.gears.module = 1.0;
    spec.gears.bevel_teeth = 14;
    spec
}

pub fn solve(spec: &Specification) -> LayoutResult<AssemblyModel> {
    LayoutSolver::default().solve(spec)
}
