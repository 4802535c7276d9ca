use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::{Committer, Module, Mutation, TaskId};

pub type ActionFuture<E> = Pin<Box<dyn Future<Output = Result<(), E>> + Send>>;

/// An asynchronous operation of a module.
///
/// `run` is called synchronously at dispatch time; anything it does before
/// returning the future happens in dispatch order. The returned future is then
/// spawned and may only affect state by committing mutations through its
/// [`ActionCtx`]. Those commits take effect only if the future resolves `Ok`.
/// An error returned from the future reaches the caller as is.
pub trait Action<M: Module>: Send + 'static {
    const NAME: &'static str;

    type Error: std::error::Error + Send + 'static;

    fn run(self, ctx: ActionCtx<M>) -> ActionFuture<Self::Error>;
}

/// What an action gets to work with: its module and a way to commit.
pub struct ActionCtx<M: Module> {
    id: TaskId,
    module: Arc<M>,
    committer: Committer<M>,
}

impl<M: Module> ActionCtx<M> {
    pub(crate) fn new(id: TaskId, module: Arc<M>, committer: Committer<M>) -> Self {
        Self {
            id,
            module,
            committer,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn module(&self) -> &M {
        &self.module
    }

    pub fn commit<T: Mutation<M>>(&self, mutation: T) {
        self.committer.commit(mutation);
    }
}
