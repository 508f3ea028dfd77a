mod session_rng;

pub mod grid;

pub use session_rng::{DICE_SIDES, SessionRng};
