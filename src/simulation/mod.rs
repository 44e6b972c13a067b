pub mod heartbeat;
pub mod update;

pub use heartbeat::{pulse, run_for_seconds, run_pulses, PulseReport};
pub use update::{point_update_char, real_update, real_update_char};
