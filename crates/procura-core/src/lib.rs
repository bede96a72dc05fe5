//! Core workflows for Procura: TTL-backed session storage, the intake
//! state machine, and the results-stack session lifecycle. HTTP concerns
//! live in `procura-server`; wire types live in `procura-types`.

mod engine;
mod error;
mod intake;
mod results_stack;
mod store;
mod summary;

pub use engine::{
    FallbackEngine, RecommendationEngine, fallback_intake, fallback_recommendations,
    postprocess_recommendations,
};
pub use error::ProcuraError;
pub use intake::{IntakeOutcome, IntakeWorkflow, RunIntakeRequest};
pub use results_stack::ResultsStack;
pub use store::SessionStore;
pub use summary::{build_structured_summary, normalize_scope};

pub type Result<T> = std::result::Result<T, ProcuraError>;
