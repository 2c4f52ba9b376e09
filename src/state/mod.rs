pub mod globe;
pub mod leaderboard;
pub mod mission;
pub mod notify;
pub mod onboarding;
pub mod scheduler;
pub mod session;

pub use globe::GlobeState;
pub use mission::{MissionAction, MissionBoard};
pub use scheduler::RefreshScheduler;
pub use session::{GateAction, GatePhase, SessionGate};
