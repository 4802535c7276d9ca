use std::any::{Any, TypeId};
use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::sync::oneshot;
use tokio::task::JoinSet;

use crate::state::Commit;
use crate::{
    Action, ActionCtx, Committer, DispatchError, DispatchHandle, Error, Module, ModuleDescriptor,
    Mutation, QualifiedPath, StateRuntime, TaskId,
};

struct Slot {
    descriptor: ModuleDescriptor,
    module: Arc<dyn Any + Send + Sync>,
    state: Box<dyn Any + Send>,
}

/// A store instance: the registered modules, their states, and the actions
/// in flight against them.
///
/// `StateCtx` is the single writer of every module state. Actions run as
/// spawned tasks and can only commit mutations onto a channel; those mutations
/// are applied when the owner calls [`StateCtx::sync`], which needs `&mut self`.
/// Two mutations therefore never interleave, and no lock guards the states.
///
/// Each `StateCtx` owns its states outright, so independent instances (one per
/// window, one per test) never observe each other.
///
/// Dispatching requires a Tokio runtime, since actions are spawned onto it.
#[derive(Default)]
pub struct StateCtx {
    runtime: StateRuntime,

    slots: BTreeMap<TypeId, Slot>,

    tasks: JoinSet<()>,
    next_seq: u64,
}

impl std::fmt::Debug for StateCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let modules: Vec<_> = self.slots.values().map(|slot| slot.descriptor.name).collect();
        f.debug_struct("StateCtx")
            .field("modules", &modules)
            .field("pending_commits", &self.runtime.pending())
            .field("tasks", &self.tasks.len())
            .finish()
    }
}

impl StateCtx {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a module with a fresh default state.
    ///
    /// Fails when a module with the same name is already registered, or when
    /// one of the module's qualified action or mutation paths is already taken.
    /// The latter can only happen for modules that are not namespaced.
    pub fn register<M: Module>(&mut self, module: M) -> Result<(), Error> {
        let descriptor = M::descriptor();

        if self.slots.contains_key(&TypeId::of::<M>())
            || self
                .slots
                .values()
                .any(|slot| slot.descriptor.name == descriptor.name)
        {
            return Err(Error::DuplicateModule {
                name: descriptor.name,
            });
        }

        for slot in self.slots.values() {
            let taken: Vec<QualifiedPath> = slot
                .descriptor
                .qualified_actions()
                .chain(slot.descriptor.qualified_mutations())
                .collect();
            if let Some(path) = descriptor
                .qualified_actions()
                .chain(descriptor.qualified_mutations())
                .find(|path| taken.contains(path))
            {
                return Err(Error::DuplicatePath {
                    path,
                    owner: slot.descriptor.name,
                });
            }
        }

        info!("Register module {}", descriptor.name);
        self.slots.insert(
            TypeId::of::<M>(),
            Slot {
                descriptor,
                module: Arc::new(module),
                state: Box::new(M::State::default()),
            },
        );
        Ok(())
    }

    pub fn is_registered<M: Module>(&self) -> bool {
        self.slots.contains_key(&TypeId::of::<M>())
    }

    pub fn try_state<M: Module>(&self) -> Result<&M::State, Error> {
        self.slots
            .get(&TypeId::of::<M>())
            .and_then(|slot| slot.state.downcast_ref::<M::State>())
            .ok_or_else(|| Error::module_not_found(M::NAME, "reading state"))
    }

    /// Current state of module `M`.
    ///
    /// # Panics
    /// Panics if `M` was never registered. Use [`StateCtx::try_state`] when
    /// that is a recoverable situation.
    pub fn state<M: Module>(&self) -> &M::State {
        self.try_state::<M>()
            .unwrap_or_else(|err| panic!("{err}"))
    }

    pub fn try_getters<M: Module>(&self) -> Result<M::Getters<'_>, Error> {
        self.try_state::<M>().map(<M::Getters<'_>>::from)
    }

    /// Getters of module `M`, evaluated against the current state.
    ///
    /// # Panics
    /// Panics if `M` was never registered.
    pub fn getters<M: Module>(&self) -> M::Getters<'_> {
        <M::Getters<'_>>::from(self.state::<M>())
    }

    fn module<M: Module>(&self) -> Result<Arc<M>, Error> {
        self.slots
            .get(&TypeId::of::<M>())
            .and_then(|slot| Arc::clone(&slot.module).downcast::<M>().ok())
            .ok_or_else(|| Error::module_not_found(M::NAME, "dispatching action"))
    }

    /// Dispatches an action without waiting for it.
    ///
    /// Use this to run several actions concurrently; follow up with
    /// [`StateCtx::flush_and_wait`] (or [`DispatchHandle::settled`] plus
    /// [`StateCtx::sync`]) to apply what they commit.
    pub fn enqueue<M, A>(&mut self, action: A) -> Result<DispatchHandle<A::Error>, Error>
    where
        M: Module,
        A: Action<M>,
    {
        let descriptor = M::descriptor();
        let path = descriptor.qualify(A::NAME);
        if !descriptor.declares_action(A::NAME) {
            return Err(Error::UnknownAction { path });
        }

        let module = self.module::<M>()?;
        self.next_seq += 1;
        let id = TaskId::new(path, self.next_seq);

        let (staged_send, staged) = flume::unbounded::<Commit>();
        let ctx = ActionCtx::new(id, module, Committer::new(staged_send));
        let future = action.run(ctx);
        let store = self.runtime.sender();
        let (send, recv) = oneshot::channel();

        info!("Dispatch {id}");
        self.tasks.spawn(async move {
            let result = future.await;
            match &result {
                Ok(()) => {
                    let mut handed_over = 0;
                    for commit in staged.drain() {
                        if store.send(commit).is_err() {
                            warn!("{id}: store was dropped, discarding commits");
                            break;
                        }
                        handed_over += 1;
                    }
                    debug!("{id} resolved with {handed_over} commits");
                }
                Err(err) => {
                    error!("{id} rejected: {err}");
                    let dropped = staged.len();
                    if dropped > 0 {
                        debug!("{id}: dropping {dropped} staged commits");
                    }
                }
            }
            if send.send(result).is_err() {
                debug!("{id} settled with nobody waiting");
            }
        });

        Ok(DispatchHandle::new(id, recv))
    }

    /// Dispatches an action and waits for it to settle.
    ///
    /// On `Ok`, whatever the action committed has already been applied. On
    /// `Err`, the action's error is returned unchanged inside
    /// [`DispatchError::Rejected`] and this action committed nothing.
    pub async fn dispatch<M, A>(&mut self, action: A) -> Result<(), DispatchError<A::Error>>
    where
        M: Module,
        A: Action<M>,
    {
        let handle = self.enqueue::<M, A>(action)?;
        let result = handle.settled().await;
        self.sync();
        result
    }

    /// Commits a mutation from the owner's side and applies it immediately,
    /// after anything committed before it.
    ///
    /// Fails without touching state when `M` does not declare the mutation.
    pub fn commit<M, T>(&mut self, mutation: T) -> Result<(), Error>
    where
        M: Module,
        T: Mutation<M>,
    {
        let commit = Commit::new::<M, T>(mutation)?;
        debug!("Commit {}", commit.path);
        self.runtime.push(commit);
        self.sync();
        Ok(())
    }

    /// Applies every committed mutation, in commit order.
    ///
    /// Returns how many mutations were applied.
    pub fn sync(&mut self) -> usize {
        self.reap_tasks();

        let mut applied = 0;
        for Commit {
            module,
            path,
            apply,
        } in self.runtime.drain()
        {
            let Some(slot) = self.slots.get_mut(&module) else {
                warn!("Dropping {path}: module is not registered");
                continue;
            };
            if apply(slot.state.as_mut()) {
                debug!("Applied {path}");
                applied += 1;
            } else {
                error!("Dropping {path}: state type mismatch");
            }
        }
        applied
    }

    fn reap_tasks(&mut self) {
        while let Some(joined) = self.tasks.try_join_next() {
            if let Err(err) = joined {
                error!("Action task failed: {err}");
            }
        }
    }

    /// Number of dispatched actions not yet reaped.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Waits for every dispatched action, syncing after each one completes.
    pub async fn flush_and_wait(&mut self) {
        self.sync();
        while let Some(joined) = self.tasks.join_next().await {
            if let Err(err) = joined {
                error!("Action task failed: {err}");
            }
            self.sync();
        }
    }

    /// Aborts actions still in flight.
    ///
    /// Actions that resolved before the abort keep their effect: their commits
    /// are applied here, so a caller holding an `Ok` always sees its mutation.
    /// Aborted actions never hand over what they staged. Meant for tearing the
    /// store down; there is no per-action cancellation.
    pub async fn shutdown(&mut self) {
        self.sync();
        self.tasks.abort_all();
        let mut aborted = 0;
        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(()) => {}
                Err(err) if err.is_cancelled() => aborted += 1,
                Err(err) => error!("Action task failed: {err}"),
            }
        }
        let applied = self.sync();
        debug!("Shutdown aborted {aborted} actions, applied {applied} late commits");
    }

    /// Every action path registered in this store, sorted.
    pub fn qualified_actions(&self) -> Vec<QualifiedPath> {
        let mut paths: Vec<_> = self
            .slots
            .values()
            .flat_map(|slot| slot.descriptor.qualified_actions().collect::<Vec<_>>())
            .collect();
        paths.sort_by_key(QualifiedPath::as_str);
        paths
    }

    /// Every mutation path registered in this store, sorted.
    pub fn qualified_mutations(&self) -> Vec<QualifiedPath> {
        let mut paths: Vec<_> = self
            .slots
            .values()
            .flat_map(|slot| slot.descriptor.qualified_mutations().collect::<Vec<_>>())
            .collect();
        paths.sort_by_key(QualifiedPath::as_str);
        paths
    }
}
