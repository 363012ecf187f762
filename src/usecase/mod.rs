//! Named use cases built on [`SpreadsheetOperations`](crate::sheets::SpreadsheetOperations).
//!
//! A use case never lets a client error escape: every failure comes back
//! as one [`UseCaseError`] so the caller decides whether to surface,
//! retry, or ignore it.

mod append_row;
mod task;

pub use append_row::{APPEND_ROW, run_append_row_use_case};
pub use task::{UseCaseHandle, UseCaseState, spawn_use_case};

use crate::error::AppError;
use std::future::Future;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Error, Debug)]
pub enum UseCaseError {
    #[error("{use_case} cancelled before completion")]
    Cancelled { use_case: &'static str },

    #[error("{use_case} failed: {source}")]
    Failed {
        use_case: &'static str,
        #[source]
        source: AppError,
    },

    #[error("{use_case} task aborted: {reason}")]
    Aborted {
        use_case: &'static str,
        reason: String,
    },
}

impl UseCaseError {
    pub fn use_case(&self) -> &'static str {
        match self {
            UseCaseError::Cancelled { use_case }
            | UseCaseError::Failed { use_case, .. }
            | UseCaseError::Aborted { use_case, .. } => use_case,
        }
    }

    /// The credential was rejected; signing in again may help.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            UseCaseError::Failed {
                source: AppError::Auth(_),
                ..
            }
        )
    }
}

/// Run one client operation, stopping early if `cancel` fires.
///
/// A request already on the wire is not rolled back when cancelled.
pub async fn run_cancellable<T, F>(
    use_case: &'static str,
    cancel: &CancellationToken,
    operation: F,
) -> Result<T, UseCaseError>
where
    F: Future<Output = crate::error::Result<T>>,
{
    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(UseCaseError::Cancelled { use_case }),
        result = operation => result,
    };

    match result {
        Ok(value) => Ok(value),
        Err(AppError::Cancelled) => Err(UseCaseError::Cancelled { use_case }),
        Err(source) => {
            debug!(use_case, error = %source, "Use case failed");
            Err(UseCaseError::Failed { use_case, source })
        }
    }
}
