pub mod engine;
pub mod journal;

pub use engine::{
    clean, CleanOptions, CleanOutcome, CleanProgress, FailureKind, ItemOutcome, ItemReport,
    SkipReason,
};
