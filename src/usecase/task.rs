use super::UseCaseError;
use std::future::Future;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info_span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UseCaseState {
    Idle,
    Running,
    Succeeded,
    Failed,
}

impl UseCaseState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, UseCaseState::Succeeded | UseCaseState::Failed)
    }
}

/// A use case running on its own task.
pub struct UseCaseHandle<T> {
    use_case: &'static str,
    state: watch::Receiver<UseCaseState>,
    cancel: CancellationToken,
    task: JoinHandle<Result<T, UseCaseError>>,
}

/// Spawn a use case on the tokio runtime. The closure receives the token
/// that [`UseCaseHandle::cancel`] fires.
pub fn spawn_use_case<T, F, Fut>(use_case: &'static str, run: F) -> UseCaseHandle<T>
where
    T: Send + 'static,
    F: FnOnce(CancellationToken) -> Fut,
    Fut: Future<Output = Result<T, UseCaseError>> + Send + 'static,
{
    let cancel = CancellationToken::new();
    let (state_tx, state) = watch::channel(UseCaseState::Idle);
    let future = run(cancel.clone());

    let task = tokio::spawn(
        async move {
            let state = StateGuard(state_tx);
            state.0.send_replace(UseCaseState::Running);
            let result = future.await;
            let terminal = match &result {
                Ok(_) => UseCaseState::Succeeded,
                Err(_) => UseCaseState::Failed,
            };
            debug!(state = ?terminal, "Use case finished");
            state.0.send_replace(terminal);
            result
        }
        .instrument(info_span!("use_case", use_case)),
    );

    UseCaseHandle {
        use_case,
        state,
        cancel,
        task,
    }
}

/// Marks the use case failed if its task stops without reaching a terminal
/// state, e.g. on panic or abort.
struct StateGuard(watch::Sender<UseCaseState>);

impl Drop for StateGuard {
    fn drop(&mut self) {
        self.0.send_if_modified(|state| {
            if state.is_terminal() {
                return false;
            }
            *state = UseCaseState::Failed;
            true
        });
    }
}

impl<T> UseCaseHandle<T> {
    pub fn use_case(&self) -> &'static str {
        self.use_case
    }

    pub fn state(&self) -> UseCaseState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<UseCaseState> {
        self.state.clone()
    }

    /// Ask the use case to stop. Requests already sent still complete remotely.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the terminal result.
    pub async fn join(self) -> Result<T, UseCaseError> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(UseCaseError::Aborted {
                use_case: self.use_case,
                reason: e.to_string(),
            }),
        }
    }
}
