//! Test case lifecycle: transactional core, transition planning and
//! post-commit side effects.

pub mod effects;
pub mod engine;
pub mod transitions;

pub use effects::{DispatchReport, EffectDispatcher, SideEffect};
pub use engine::TestCaseEngine;
pub use transitions::{Snapshot, TransitionPlan};
