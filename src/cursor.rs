//! Cursor state for laying parts out along an axis.

use glam::{DQuat, DVec3};

/// A running coordinate along an axis.
///
/// Parts are stacked one after another: [`AxisCursor::span`] reserves room for a
/// part, returns the centre of that room and moves the cursor to its far end.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisCursor {
    /// Current position of the cursor in the assembly frame.
    pub position: DVec3,

    /// Orientation of the axis being walked; the cursor advances along local +Z.
    pub rotation: DQuat,
}

impl Default for AxisCursor {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
        }
    }
}

impl AxisCursor {
    pub fn new(position: DVec3, rotation: DQuat) -> Self {
        Self { position, rotation }
    }

    /// Direction the cursor advances in.
    pub fn forward(&self) -> DVec3 {
        self.rotation * DVec3::Z
    }

    /// Signed distance travelled along the axis from the frame origin.
    pub fn coordinate(&self) -> f64 {
        self.position.dot(self.forward())
    }

    /// Moves forward without placing anything.
    pub fn advance(&mut self, length: f64) {
        self.position += self.forward() * length;
    }

    /// Reserves `length` for a part and returns the centre of the reserved span.
    pub fn span(&mut self, length: f64) -> DVec3 {
        let center = self.position + self.forward() * (length / 2.0);
        self.advance(length);
        center
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_returns_centre_and_moves_to_far_end() {
        let mut cursor = AxisCursor::default();
        let center = cursor.span(4.0);
        assert_eq!(center, DVec3::new(0.0, 0.0, 2.0));
        assert_eq!(cursor.coordinate(), 4.0);
    }

    #[test]
    fn advance_leaves_a_gap() {
        let mut cursor = AxisCursor::default();
        cursor.span(4.0);
        cursor.advance(3.0);
        let center = cursor.span(8.0);
        assert_eq!(center.z, 11.0);
        assert_eq!(cursor.coordinate(), 15.0);
    }
}
