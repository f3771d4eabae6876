//! Motor-driving session logic: pulse primitives, the ramp regression
//! tester, manual twitch control, and operator input.

pub mod operator;
pub mod pulse;
pub mod ramp;
pub mod twitch;
