use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use crate::errors::{LabClientError, SharedError};

/// Result of an orchestration action.
///
/// The error is shared with the [`ActionState`] that recorded it.
pub type ActionResult<T> = std::result::Result<T, SharedError>;

/// Lifecycle of a single user-triggered action.
///
/// `Idle → Pending → {Success | Failed}`. An action enters `Pending` whenever it is invoked,
/// including from a terminal state. Only [`reset`](ActionState::reset) returns it to `Idle`.
#[derive(Clone, Debug, Default)]
pub enum ActionState<T> {
    #[default]
    Idle,
    Pending,
    Success(T),
    Failed(SharedError),
}

impl<T> ActionState<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, ActionState::Idle)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ActionState::Pending)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ActionState::Success(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ActionState::Failed(_))
    }

    /// Value of a successful action.
    pub fn value(&self) -> Option<&T> {
        match self {
            ActionState::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Error of a failed action.
    pub fn error(&self) -> Option<&SharedError> {
        match self {
            ActionState::Failed(error) => Some(error),
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        *self = ActionState::Idle;
    }

    pub fn map<U, F: FnOnce(&T) -> U>(&self, f: F) -> ActionState<U> {
        match self {
            ActionState::Idle => ActionState::Idle,
            ActionState::Pending => ActionState::Pending,
            ActionState::Success(value) => ActionState::Success(f(value)),
            ActionState::Failed(error) => ActionState::Failed(error.clone()),
        }
    }
}

/// Tracks whether the screen owning an action is still attached to the presentation layer.
#[derive(Debug)]
pub(crate) struct Mount(AtomicBool);

impl Default for Mount {
    fn default() -> Self {
        Self(AtomicBool::new(true))
    }
}

impl Mount {
    pub fn unmount(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_mounted(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Holds the [`ActionState`] of one action of a screen.
#[derive(Debug)]
pub(crate) struct ActionSlot<T> {
    name: &'static str,
    state: parking_lot::RwLock<ActionState<T>>,
}

impl<T: Clone> ActionSlot<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: parking_lot::RwLock::new(ActionState::Idle),
        }
    }

    pub fn get(&self) -> ActionState<T> {
        self.state.read().clone()
    }

    pub fn reset(&self) {
        self.state.write().reset();
    }

    /// Sets the state unless the owning screen has been unmounted.
    pub fn set(&self, mount: &Mount, state: ActionState<T>) {
        if mount.is_mounted() {
            *self.state.write() = state;
        } else {
            tracing::debug!(action = self.name, "screen unmounted, action state left unchanged");
        }
    }

    /// Fails the action without running anything.
    pub fn fail(&self, mount: &Mount, error: LabClientError) -> SharedError {
        let error = Arc::new(error);
        self.set(mount, ActionState::Failed(error.clone()));
        error
    }

    /// Runs the given operation and records its lifecycle.
    ///
    /// The operation itself always runs to completion; only the recorded state depends on
    /// whether the screen is still mounted when it completes.
    pub async fn run<F>(&self, mount: &Mount, operation: F) -> ActionResult<T>
    where
        F: Future<Output = Result<T, LabClientError>>,
    {
        tracing::debug!(action = self.name, "action started");
        self.set(mount, ActionState::Pending);

        match operation.await {
            Ok(value) => {
                tracing::debug!(action = self.name, "action succeeded");
                self.set(mount, ActionState::Success(value.clone()));
                Ok(value)
            }
            Err(error) => {
                tracing::debug!(action = self.name, %error, "action failed");
                Err(self.fail(mount, error))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[tokio::test]
    async fn successful_action_ends_in_success() {
        let mount = Mount::default();
        let slot = ActionSlot::<u32>::new("test");
        assert!(slot.get().is_idle());

        let value = slot.run(&mount, async { Ok(5) }).await.unwrap();
        assert_eq!(value, 5);
        assert_eq!(slot.get().value(), Some(&5));
    }

    #[tokio::test]
    async fn failed_action_shares_the_returned_error() {
        let mount = Mount::default();
        let slot = ActionSlot::<u32>::new("test");

        let err = slot
            .run(&mount, async { Err(ErrorKind::PreconditionError("nothing to do").into()) })
            .await
            .unwrap_err();

        let state = slot.get();
        assert!(Arc::ptr_eq(&err, state.error().unwrap()));
        assert!(err.is_precondition());
    }

    #[tokio::test]
    async fn terminal_state_is_kept_until_reset() {
        let mount = Mount::default();
        let slot = ActionSlot::<u32>::new("test");
        slot.run(&mount, async { Ok(1) }).await.unwrap();
        assert!(slot.get().is_success());

        slot.reset();
        assert!(slot.get().is_idle());
    }

    #[tokio::test]
    async fn unmounted_slot_is_not_updated() {
        let mount = Mount::default();
        let slot = ActionSlot::<u32>::new("test");
        mount.unmount();

        let value = slot.run(&mount, async { Ok(1) }).await.unwrap();
        assert_eq!(value, 1);
        assert!(slot.get().is_idle());
    }

    #[test]
    fn map_keeps_the_lifecycle() {
        let state = ActionState::Success(vec![1, 2, 3]);
        assert_eq!(state.map(|v| v.len()).value(), Some(&3));
        assert!(ActionState::<u32>::Pending.map(|v| *v).is_pending());
    }
}
