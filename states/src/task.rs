//! Identity and settlement of dispatched actions.
//!
//! Every dispatch gets a `TaskId` made of the action's qualified path and a
//! per-store sequence number, so log lines from overlapping dispatches of the
//! same action can be told apart. `DispatchHandle` is what the caller holds
//! while the action runs; awaiting it yields the action's result.
//!
//! A handle cannot cancel its action: once dispatched, an
//! action runs until its collaborator call succeeds or fails. Dropping the
//! handle only means nobody observes the result.

use std::fmt::{Display, Formatter};

use tokio::sync::oneshot;

use crate::{DispatchError, QualifiedPath};

/// Unique identifier for a dispatched action.
///
/// Sequence numbers increase monotonically per `StateCtx`, in dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId {
    path: QualifiedPath,
    seq: u64,
}

impl TaskId {
    pub fn new(path: QualifiedPath, seq: u64) -> Self {
        Self { path, seq }
    }

    pub fn path(&self) -> QualifiedPath {
        self.path
    }

    /// Position of this dispatch among all dispatches on the same store.
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.path, self.seq)
    }
}

/// Pending result of a dispatched action.
#[derive(Debug)]
pub struct DispatchHandle<E> {
    id: TaskId,
    recv: oneshot::Receiver<Result<(), E>>,
}

impl<E> DispatchHandle<E>
where
    E: std::error::Error + 'static,
{
    pub(crate) fn new(id: TaskId, recv: oneshot::Receiver<Result<(), E>>) -> Self {
        Self { id, recv }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Waits for the action to settle.
    ///
    /// A successful action hands its mutations to the store before its result
    /// is delivered, so after this resolves with `Ok` a call to `StateCtx::sync`
    /// is guaranteed to make the mutation visible.
    pub async fn settled(self) -> Result<(), DispatchError<E>> {
        match self.recv.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(DispatchError::Rejected(err)),
            Err(_) => Err(DispatchError::Aborted {
                path: self.id.path(),
            }),
        }
    }
}
