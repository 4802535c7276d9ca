use flume::{Receiver, Sender};
use log::warn;

use crate::state::Commit;

/// The mutation channel shared by a store and every action it spawns.
///
/// Actions hand over their staged mutations when they resolve, and the channel
/// is FIFO, so the store drains mutations in the order their actions completed.
#[derive(Debug)]
pub struct StateRuntime {
    send: Sender<Commit>,
    recv: Receiver<Commit>,
}

impl Default for StateRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl StateRuntime {
    pub fn new() -> Self {
        let (send, recv) = flume::unbounded();
        Self { send, recv }
    }

    pub(crate) fn sender(&self) -> Sender<Commit> {
        self.send.clone()
    }

    pub(crate) fn push(&self, commit: Commit) {
        if let Err(err) = self.send.send(commit) {
            warn!("Store was dropped, discarding {}", err.into_inner().path);
        }
    }

    pub(crate) fn drain(&self) -> impl Iterator<Item = Commit> + '_ {
        self.recv.try_iter()
    }

    /// Number of mutations committed but not yet applied.
    pub fn pending(&self) -> usize {
        self.recv.len()
    }
}
