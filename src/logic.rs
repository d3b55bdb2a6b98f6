//! Logic model of the mux element.
//!
//! Logic values are carried as shaft rotation direction. The selector S shifts
//! the dog clutch onto gear A or gear B, and the output O follows whichever gear
//! the clutch engages: `O = S ? B : A`.

use crate::primary::{DOG_CLUTCH, GEAR_A, GEAR_B};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// A logic level, encoded as a rotation direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicValue {
    /// Clockwise.
    Zero,
    /// Counter-clockwise.
    One,
}

impl LogicValue {
    pub const ALL: [Self; 2] = [Self::Zero, Self::One];

    pub fn is_clockwise(self) -> bool {
        self == Self::Zero
    }
}

impl From<bool> for LogicValue {
    fn from(value: bool) -> Self {
        if value { Self::One } else { Self::Zero }
    }
}

/// A route through the gear train from one input to the output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GearPath {
    pub input: String,
    pub output: String,
    /// Part ids the motion passes through, input side first.
    pub stages: Vec<String>,
    /// Combined ratio; negative means the direction is inverted.
    pub ratio: f64,
}

impl GearPath {
    fn direct(input: &str, stages: &[&str]) -> Self {
        Self {
            input: input.to_string(),
            output: "o".to_string(),
            stages: stages.iter().map(|s| s.to_string()).collect(),
            ratio: 1.0,
        }
    }

    pub fn inverts(&self) -> bool {
        self.ratio < 0.0
    }
}

/// Inputs of one truth-table row.
pub type MuxInputs = (LogicValue, LogicValue, LogicValue);

/// A problem found by [`MuxLogic::verify`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LogicViolation {
    #[error("missing truth table entry for (A={0:?}, B={1:?}, S={2:?})")]
    Missing(LogicValue, LogicValue, LogicValue),

    #[error("mux violation at {inputs:?}: expected O={expected:?}, got O={actual:?}")]
    WrongOutput {
        inputs: MuxInputs,
        expected: LogicValue,
        actual: LogicValue,
    },
}

/// Truth table and gear paths of the 2:1 mux.
#[derive(Clone, Debug, PartialEq)]
pub struct MuxLogic {
    table: BTreeMap<MuxInputs, LogicValue>,
    path_a: GearPath,
    path_b: GearPath,
}

impl Default for MuxLogic {
    fn default() -> Self {
        Self::new()
    }
}

impl MuxLogic {
    /// The complete mux: S = 0 engages gear A, S = 1 engages gear B.
    pub fn new() -> Self {
        let mut table = BTreeMap::new();
        for a in LogicValue::ALL {
            for b in LogicValue::ALL {
                table.insert((a, b, LogicValue::Zero), a);
                table.insert((a, b, LogicValue::One), b);
            }
        }
        Self {
            table,
            path_a: GearPath::direct("a", &[GEAR_A, DOG_CLUTCH]),
            path_b: GearPath::direct("b", &[GEAR_B, DOG_CLUTCH]),
        }
    }

    /// A mux with an empty truth table, for filling in row by row.
    pub fn empty() -> Self {
        Self {
            table: BTreeMap::new(),
            ..Self::new()
        }
    }

    pub fn set(&mut self, a: LogicValue, b: LogicValue, s: LogicValue, o: LogicValue) {
        self.table.insert((a, b, s), o);
    }

    pub fn output(&self, a: LogicValue, b: LogicValue, s: LogicValue) -> Option<LogicValue> {
        self.table.get(&(a, b, s)).copied()
    }

    /// The path the clutch engages for selector value `s`.
    pub fn active_path(&self, s: LogicValue) -> &GearPath {
        match s {
            LogicValue::Zero => &self.path_a,
            LogicValue::One => &self.path_b,
        }
    }

    /// Checks that every input combination is present and follows `O = S ? B : A`.
    pub fn verify(&self) -> Vec<LogicViolation> {
        let mut violations = Vec::new();
        for a in LogicValue::ALL {
            for b in LogicValue::ALL {
                for s in LogicValue::ALL {
                    let expected = match s {
                        LogicValue::Zero => a,
                        LogicValue::One => b,
                    };
                    match self.output(a, b, s) {
                        None => violations.push(LogicViolation::Missing(a, b, s)),
                        Some(actual) if actual != expected => {
                            violations.push(LogicViolation::WrongOutput {
                                inputs: (a, b, s),
                                expected,
                                actual,
                            })
                        }
                        Some(_) => {}
                    }
                }
            }
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use LogicValue::{One, Zero};

    #[test]
    fn selector_picks_the_input() {
        let mux = MuxLogic::new();
        assert_eq!(mux.output(Zero, One, Zero), Some(Zero));
        assert_eq!(mux.output(One, Zero, Zero), Some(One));
        assert_eq!(mux.output(Zero, One, One), Some(One));
        assert_eq!(mux.output(One, Zero, One), Some(Zero));
        assert!(mux.verify().is_empty());
    }

    #[test]
    fn active_path_runs_through_engaged_gear() {
        let mux = MuxLogic::new();
        assert_eq!(mux.active_path(Zero).stages, vec![GEAR_A, DOG_CLUTCH]);
        assert_eq!(mux.active_path(One).input, "b");
        assert!(!mux.active_path(One).inverts());
    }

    #[test]
    fn incomplete_table_reports_missing_rows() {
        let mut mux = MuxLogic::empty();
        mux.set(Zero, Zero, Zero, Zero);
        let violations = mux.verify();
        assert_eq!(violations.len(), 7);
        assert!(
            violations
                .iter()
                .all(|v| matches!(v, LogicViolation::Missing(..)))
        );
    }

    #[test]
    fn corrupted_row_is_a_mux_violation() {
        let mut mux = MuxLogic::new();
        mux.set(Zero, One, Zero, One);
        assert_eq!(
            mux.verify(),
            vec![LogicViolation::WrongOutput {
                inputs: (Zero, One, Zero),
                expected: Zero,
                actual: One,
            }]
        );
    }
}
