use thiserror::Error;

use crate::combine::CombineError;
use crate::identity::AuthError;
use crate::model::ValidationError;
use crate::storage::StorageError;

/// Anything a page handler may have to show the user. None of these are fatal;
/// every one is recovered by retrying or cancelling.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Combine(#[from] CombineError),
}
