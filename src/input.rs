#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The driver's intents for a single frame.
///
/// The simulation never binds to physical keys; the host samples its input
/// devices once per frame and hands over a snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DriverInput {
    pub forward: bool,
    pub backward: bool,
    pub brake: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    pub nitro: bool,
    pub horn: bool,
}

impl DriverInput {
    /// The steering direction: `1` for left, `-1` for right and `0` when
    /// neither or both are held.
    pub fn steering(&self) -> i8 {
        self.turn_left as i8 - self.turn_right as i8
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn opposing_steering_cancels() {
        let input = DriverInput {
            turn_left: true,
            turn_right: true,
            ..Default::default()
        };
        assert_eq!(input.steering(), 0);
        assert_eq!(DriverInput { turn_right: false, ..input }.steering(), 1);
    }
}
