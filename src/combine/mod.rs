pub mod aggregate;
pub mod entry;
pub mod machine;
pub mod registry;
pub mod runtime;

use thiserror::Error;

use crate::model::WedgeId;

pub use aggregate::trimmed_mean;
pub use entry::parse_shot_entry;
pub use machine::{CombineModel, Effect, Msg, NextControl, Outcome, Phase, update};
pub use registry::CombineRegistry;
pub use runtime::CombineDriver;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CombineError {
    #[error("a combine for wedge {0} is already in progress")]
    SessionActive(WedgeId),
    #[error("no combine in progress")]
    NoActiveSession,
}
