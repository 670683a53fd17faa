//! Controller layer: shell modes, the dashboard composition, command parsing
//! and error modeling.

pub mod dashboard;
pub mod events;
pub mod orchestration;
pub mod router;
