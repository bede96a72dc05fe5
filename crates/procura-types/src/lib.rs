//! Shared data types for Procura.

pub mod intake;
pub mod kiba;

pub use intake::{
    IntakeResult, IntakeSession, IntakeStage, ProjectContext, Recommendations, SpecVariant,
};
pub use kiba::{
    AuditEntry, EvaluationStep, FinalSnapshot, KibaSession, Run, SelectionStep, SessionPhase,
    Steps, VendorSearchStep,
};
