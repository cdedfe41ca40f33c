//! Concrete plans, one per desire

pub mod assault;
pub mod capture;
pub mod defend;
pub mod guard;
pub mod retreat;
pub mod scouting;

pub use assault::AssaultPlan;
pub use capture::CapturePlan;
pub use defend::DefendCampPlan;
pub use guard::GuardPlan;
pub use retreat::RetreatPlan;
pub use scouting::ScoutingPlan;
