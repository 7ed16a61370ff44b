//! Pod chaos for podchaosmonkey
//!
//! Periodically picks one running pod from the mirror and deletes it:
//! - Victim selection (random in production, injectable for tests)
//! - The per-cycle read, select, resolve, delete protocol
//! - The timer loop driving cycles until shutdown

mod orchestrator;
mod scheduler;
mod selector;
pub mod types;

pub use orchestrator::PodChaosMonkey;
pub use scheduler::run_scheduler;
pub use selector::{IndexSelector, RandomSelector, VictimSelector};
pub use types::*;
