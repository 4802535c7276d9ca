//! Namespaced, single-writer store modules.
//!
//! A [`StateCtx`] holds any number of [`Module`]s. Each module owns one state
//! value that only its [`Mutation`]s may write. [`Action`]s do the async work
//! (usually a network call) and commit mutations when they succeed; the owner
//! of the `StateCtx` applies those commits with [`StateCtx::sync`]. Getters are
//! pure read views built from a state reference.

mod action;
mod ctx;
mod error;
mod module;
mod runtime;
mod state;
mod task;

pub use action::{Action, ActionCtx, ActionFuture};
pub use ctx::StateCtx;
pub use error::{DispatchError, Error};
pub use module::{Module, ModuleDescriptor, QualifiedPath};
pub use runtime::StateRuntime;
pub use state::{Committer, Mutation};
pub use task::{DispatchHandle, TaskId};

#[cfg(test)]
mod state_ctx_test {
    use std::time::Duration;

    use super::*;

    #[derive(Debug, thiserror::Error, PartialEq, Eq)]
    #[error("counter refused: {0}")]
    struct Refused(&'static str);

    #[derive(Debug, Default)]
    struct CounterState {
        log: Vec<u32>,
    }

    struct CounterGetters<'a> {
        state: &'a CounterState,
    }

    impl<'a> From<&'a CounterState> for CounterGetters<'a> {
        fn from(state: &'a CounterState) -> Self {
            Self { state }
        }
    }

    impl CounterGetters<'_> {
        fn total(&self) -> u32 {
            self.state.log.iter().sum()
        }
    }

    struct Counter;

    impl Module for Counter {
        const NAME: &'static str = "counter";
        type State = CounterState;
        type Getters<'a> = CounterGetters<'a>;

        fn descriptor() -> ModuleDescriptor {
            ModuleDescriptor::namespaced(Self::NAME)
                .with_getters(&["total"])
                .with_actions(&["add", "addLater", "pushThenRefuse", "resetLater"])
                .with_mutations(&["push"])
        }
    }

    struct Push(u32);

    impl Mutation<Counter> for Push {
        const NAME: &'static str = "push";

        fn apply(self, state: &mut CounterState) {
            state.log.push(self.0);
        }
    }

    struct Add(Result<u32, &'static str>);

    impl Action<Counter> for Add {
        const NAME: &'static str = "add";
        type Error = Refused;

        fn run(self, ctx: ActionCtx<Counter>) -> ActionFuture<Refused> {
            Box::pin(async move {
                let value = self.0.map_err(Refused)?;
                ctx.commit(Push(value));
                Ok(())
            })
        }
    }

    struct AddLater {
        value: u32,
        delay: Duration,
    }

    impl Action<Counter> for AddLater {
        const NAME: &'static str = "addLater";
        type Error = Refused;

        fn run(self, ctx: ActionCtx<Counter>) -> ActionFuture<Refused> {
            Box::pin(async move {
                tokio::time::sleep(self.delay).await;
                ctx.commit(Push(self.value));
                Ok(())
            })
        }
    }

    struct PushThenRefuse(u32);

    impl Action<Counter> for PushThenRefuse {
        const NAME: &'static str = "pushThenRefuse";
        type Error = Refused;

        fn run(self, ctx: ActionCtx<Counter>) -> ActionFuture<Refused> {
            Box::pin(async move {
                ctx.commit(Push(self.0));
                tokio::task::yield_now().await;
                Err(Refused("changed my mind"))
            })
        }
    }

    struct Reset;

    impl Mutation<Counter> for Reset {
        const NAME: &'static str = "reset";

        fn apply(self, state: &mut CounterState) {
            state.log.clear();
        }
    }

    struct ResetLater;

    impl Action<Counter> for ResetLater {
        const NAME: &'static str = "resetLater";
        type Error = Refused;

        fn run(self, ctx: ActionCtx<Counter>) -> ActionFuture<Refused> {
            Box::pin(async move {
                ctx.commit(Reset);
                Ok(())
            })
        }
    }

    struct Undeclared;

    impl Action<Counter> for Undeclared {
        const NAME: &'static str = "undeclared";
        type Error = Refused;

        fn run(self, _ctx: ActionCtx<Counter>) -> ActionFuture<Refused> {
            Box::pin(async { Ok(()) })
        }
    }

    struct Legacy;

    impl Module for Legacy {
        const NAME: &'static str = "legacy";
        type State = CounterState;
        type Getters<'a> = CounterGetters<'a>;

        fn descriptor() -> ModuleDescriptor {
            ModuleDescriptor::global(Self::NAME).with_mutations(&["push"])
        }
    }

    struct OtherLegacy;

    impl Module for OtherLegacy {
        const NAME: &'static str = "other_legacy";
        type State = CounterState;
        type Getters<'a> = CounterGetters<'a>;

        fn descriptor() -> ModuleDescriptor {
            ModuleDescriptor::global(Self::NAME).with_mutations(&["push"])
        }
    }

    fn counter_ctx() -> StateCtx {
        let mut ctx = StateCtx::new();
        ctx.register(Counter).unwrap();
        ctx
    }

    #[test]
    fn registered_module_starts_from_default_state() {
        let ctx = counter_ctx();

        assert!(ctx.is_registered::<Counter>());
        assert!(ctx.state::<Counter>().log.is_empty());
        assert_eq!(ctx.getters::<Counter>().total(), 0);
    }

    #[test]
    fn unregistered_module_is_an_error() {
        let ctx = StateCtx::new();

        assert!(matches!(
            ctx.try_state::<Counter>(),
            Err(Error::ModuleNotFound { name: "counter", .. })
        ));
        assert!(ctx.try_getters::<Counter>().is_err());
    }

    #[test]
    fn duplicate_module_is_rejected() {
        let mut ctx = counter_ctx();

        assert_eq!(
            ctx.register(Counter),
            Err(Error::DuplicateModule { name: "counter" })
        );
    }

    #[test]
    fn global_modules_cannot_share_paths() {
        let mut ctx = StateCtx::new();
        ctx.register(Legacy).unwrap();

        let err = ctx.register(OtherLegacy).unwrap_err();
        assert_eq!(
            err,
            Error::DuplicatePath {
                path: QualifiedPath::global("push"),
                owner: "legacy",
            }
        );
    }

    #[test]
    fn namespaced_and_global_modules_coexist() {
        let mut ctx = counter_ctx();
        ctx.register(Legacy).unwrap();

        let mutations: Vec<_> = ctx
            .qualified_mutations()
            .iter()
            .map(QualifiedPath::as_str)
            .collect();
        assert_eq!(mutations, vec!["counter/push", "push"]);
        assert_eq!(
            ctx.qualified_actions(),
            vec![
                QualifiedPath::of("counter", "add"),
                QualifiedPath::of("counter", "addLater"),
                QualifiedPath::of("counter", "pushThenRefuse"),
                QualifiedPath::of("counter", "resetLater"),
            ]
        );
    }

    #[test]
    fn independent_stores_do_not_share_state() {
        let mut first = counter_ctx();
        let second = counter_ctx();

        first.commit::<Counter, _>(Push(1)).unwrap();

        assert_eq!(first.state::<Counter>().log, vec![1]);
        assert!(second.state::<Counter>().log.is_empty());
    }

    #[tokio::test]
    async fn dispatch_applies_commit_before_returning() {
        let mut ctx = counter_ctx();

        ctx.dispatch::<Counter, _>(Add(Ok(3))).await.unwrap();

        assert_eq!(ctx.state::<Counter>().log, vec![3]);
        assert_eq!(ctx.getters::<Counter>().total(), 3);
    }

    #[tokio::test]
    async fn rejected_dispatch_leaves_state_untouched() {
        let mut ctx = counter_ctx();
        ctx.dispatch::<Counter, _>(Add(Ok(1))).await.unwrap();

        let err = ctx
            .dispatch::<Counter, _>(Add(Err("nope")))
            .await
            .unwrap_err();

        assert_eq!(err.rejection(), Some(&Refused("nope")));
        assert_eq!(ctx.state::<Counter>().log, vec![1]);
    }

    #[tokio::test]
    async fn undeclared_action_is_not_dispatched() {
        let mut ctx = counter_ctx();

        let err = ctx.enqueue::<Counter, _>(Undeclared).unwrap_err();

        assert_eq!(
            err,
            Error::UnknownAction {
                path: QualifiedPath::of("counter", "undeclared"),
            }
        );
        assert_eq!(ctx.task_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn commits_apply_in_completion_order() {
        let mut ctx = counter_ctx();

        let slow = ctx
            .enqueue::<Counter, _>(AddLater {
                value: 1,
                delay: Duration::from_millis(50),
            })
            .unwrap();
        let fast = ctx
            .enqueue::<Counter, _>(AddLater {
                value: 2,
                delay: Duration::from_millis(10),
            })
            .unwrap();
        assert!(slow.id().seq() < fast.id().seq());

        ctx.flush_and_wait().await;

        assert_eq!(ctx.state::<Counter>().log, vec![2, 1]);
        assert_eq!(ctx.task_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn state_is_unchanged_until_sync() {
        let mut ctx = counter_ctx();

        let handle = ctx.enqueue::<Counter, _>(Add(Ok(5))).unwrap();
        handle.settled().await.unwrap();
        assert!(ctx.state::<Counter>().log.is_empty());

        assert_eq!(ctx.sync(), 1);
        assert_eq!(ctx.state::<Counter>().log, vec![5]);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_discards_in_flight_actions() {
        let mut ctx = counter_ctx();

        let handle = ctx
            .enqueue::<Counter, _>(AddLater {
                value: 9,
                delay: Duration::from_secs(60),
            })
            .unwrap();
        ctx.shutdown().await;

        assert!(matches!(
            handle.settled().await,
            Err(DispatchError::Aborted { .. })
        ));
        assert_eq!(ctx.sync(), 0);
        assert!(ctx.state::<Counter>().log.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_keeps_commits_of_settled_actions() {
        let mut ctx = counter_ctx();

        let handle = ctx.enqueue::<Counter, _>(Add(Ok(4))).unwrap();
        handle.settled().await.unwrap();
        ctx.shutdown().await;

        assert_eq!(ctx.state::<Counter>().log, vec![4]);
        assert_eq!(ctx.sync(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_applies_settled_and_drops_in_flight() {
        let mut ctx = counter_ctx();

        let done = ctx.enqueue::<Counter, _>(Add(Ok(1))).unwrap();
        let pending = ctx
            .enqueue::<Counter, _>(AddLater {
                value: 2,
                delay: Duration::from_secs(60),
            })
            .unwrap();
        done.settled().await.unwrap();
        ctx.shutdown().await;

        assert!(matches!(
            pending.settled().await,
            Err(DispatchError::Aborted { .. })
        ));
        assert_eq!(ctx.state::<Counter>().log, vec![1]);
    }

    #[tokio::test]
    async fn rejected_action_drops_what_it_staged() {
        let mut ctx = counter_ctx();

        let err = ctx
            .dispatch::<Counter, _>(PushThenRefuse(7))
            .await
            .unwrap_err();

        assert_eq!(err.into_rejection(), Some(Refused("changed my mind")));
        assert_eq!(ctx.sync(), 0);
        assert!(ctx.state::<Counter>().log.is_empty());
    }

    #[test]
    fn undeclared_mutation_is_refused_by_the_owner() {
        let mut ctx = counter_ctx();
        ctx.commit::<Counter, _>(Push(3)).unwrap();

        let err = ctx.commit::<Counter, _>(Reset).unwrap_err();

        assert_eq!(
            err,
            Error::UnknownMutation {
                path: QualifiedPath::of("counter", "reset"),
            }
        );
        assert_eq!(ctx.state::<Counter>().log, vec![3]);
    }

    #[tokio::test]
    async fn undeclared_mutation_is_dropped_inside_an_action() {
        let mut ctx = counter_ctx();
        ctx.commit::<Counter, _>(Push(3)).unwrap();

        ctx.dispatch::<Counter, _>(ResetLater).await.unwrap();

        assert_eq!(ctx.state::<Counter>().log, vec![3]);
    }
}
