//! Host-side platform for the bumper robot: a wall clock and a simulated
//! differential-drive robot in a walled arena.

mod clock;
mod sim;

pub use clock::StdClock;
pub use sim::{Arena, Pose, SimRobot};
