use std::any::{Any, TypeId};
use std::marker::PhantomData;

use flume::Sender;
use log::{debug, error};

use crate::{Error, Module, QualifiedPath};

/// The only way to write a module's state.
///
/// A mutation is synchronous and total: it receives exclusive access to the
/// state and must leave it consistent before returning.
pub trait Mutation<M: Module>: Send + 'static {
    const NAME: &'static str;

    fn apply(self, state: &mut M::State);
}

/// A mutation queued for the owner of the store, already erased to the state it
/// targets.
pub(crate) struct Commit {
    pub(crate) module: TypeId,
    pub(crate) path: QualifiedPath,
    pub(crate) apply: Box<dyn FnOnce(&mut dyn Any) -> bool + Send>,
}

impl Commit {
    /// Erases `mutation`, refusing names the module does not declare.
    pub(crate) fn new<M, T>(mutation: T) -> Result<Self, Error>
    where
        M: Module,
        T: Mutation<M>,
    {
        let descriptor = M::descriptor();
        let path = descriptor.qualify(T::NAME);
        if !descriptor.declares_mutation(T::NAME) {
            return Err(Error::UnknownMutation { path });
        }

        Ok(Self {
            module: TypeId::of::<M>(),
            path,
            apply: Box::new(move |state: &mut dyn Any| {
                match state.downcast_mut::<M::State>() {
                    Some(state) => {
                        mutation.apply(state);
                        true
                    }
                    None => false,
                }
            }),
        })
    }
}

impl std::fmt::Debug for Commit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Commit").field("path", &self.path).finish()
    }
}

/// Handle that actions use to enqueue mutations for their module.
///
/// Committing never touches state. Mutations are staged for the running action
/// and handed to the store only if the action resolves `Ok`; the store applies
/// them the next time its owner calls `StateCtx::sync`. A rejected or aborted
/// action leaves nothing behind.
pub struct Committer<M: Module> {
    _marker: PhantomData<fn() -> M>,
    send: Sender<Commit>,
}

impl<M: Module> Clone for Committer<M> {
    fn clone(&self) -> Self {
        Self {
            _marker: PhantomData,
            send: self.send.clone(),
        }
    }
}

impl<M: Module> std::fmt::Debug for Committer<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Committer")
            .field("module", &M::NAME)
            .finish()
    }
}

impl<M: Module> Committer<M> {
    pub(crate) fn new(send: Sender<Commit>) -> Self {
        Self {
            _marker: PhantomData,
            send,
        }
    }

    /// Stages `mutation`. An undeclared mutation is logged and dropped.
    pub fn commit<T: Mutation<M>>(&self, mutation: T) {
        let commit = match Commit::new::<M, T>(mutation) {
            Ok(commit) => commit,
            Err(err) => {
                error!("Dropping commit: {err}");
                return;
            }
        };

        debug!("Stage {}", commit.path);
        if self.send.send(commit).is_err() {
            error!("Action finished before its commit could be staged");
        }
    }
}
