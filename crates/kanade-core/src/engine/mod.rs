pub mod config;
pub mod registration;
pub mod stream;
pub mod types;

pub use config::{EngineConfig, KernelParams, SolverVariant, TransformMode};
pub use registration::RegistrationEngine;
pub use stream::register_ser;
pub use types::{
    FrameOutcome, FrameStatus, NoOpReporter, ProgressReporter, StreamStage, StreamSummary,
};
