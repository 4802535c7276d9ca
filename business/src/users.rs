//! Users module: a cached directory of registered users.
//!
//! `FetchUsers` lists the registered users and commits `SetUsers`, which
//! replaces the directory wholesale. While a fetch is in flight the previous
//! directory stays visible.
//!
//! Every fetch is stamped with a generation when it is dispatched. If an older
//! fetch resolves after a newer one has already been applied, its directory is
//! discarded, so the directory always reflects the most recently *issued* fetch
//! that succeeded.
//!
//! Lookups never fail: a miss yields [`EMPTY_USER`], whose fields are all empty
//! strings, so callers can read fields off the result unconditionally.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bidboard_states::{Action, ActionCtx, ActionFuture, Module, ModuleDescriptor, Mutation};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{ApiError, LoginApi};

/// A registered user as listed by the login service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: String,
    pub approle: String,
    pub color: String,
    pub avatar: String,
}

/// Returned by lookups that find nothing. Never stored in the directory.
pub static EMPTY_USER: User = User {
    id: String::new(),
    approle: String::new(),
    color: String::new(),
    avatar: String::new(),
};

#[derive(Debug, Default)]
pub struct UsersState {
    users: Vec<User>,
    generation: u64,
    last_fetch: Option<DateTime<Utc>>,
}

/// The users module, carrying the login collaborator its actions call.
#[derive(Debug)]
pub struct UsersModule<L> {
    login: Arc<L>,
    issued: AtomicU64,
}

impl<L: LoginApi> UsersModule<L> {
    pub fn new(login: L) -> Self {
        Self {
            login: Arc::new(login),
            issued: AtomicU64::new(0),
        }
    }

    pub fn login(&self) -> &L {
        &self.login
    }

    fn issue_generation(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl<L: LoginApi> Module for UsersModule<L> {
    const NAME: &'static str = "users";

    type State = UsersState;
    type Getters<'a> = UsersGetters<'a>;

    fn descriptor() -> ModuleDescriptor {
        ModuleDescriptor::namespaced(Self::NAME)
            .with_getters(&[
                "users",
                "userByName",
                "userNames",
                "avatarByName",
                "colorByName",
                "approleByName",
                "len",
                "isEmpty",
                "lastFetch",
            ])
            .with_actions(&[FetchUsers::NAME])
            .with_mutations(&[SetUsers::NAME])
    }
}

/// Replaces the directory with a freshly fetched one.
#[derive(Debug)]
pub struct SetUsers {
    users: Vec<User>,
    generation: u64,
    fetched_at: DateTime<Utc>,
}

impl SetUsers {
    pub const NAME: &'static str = "setUsers";

    pub fn new(users: Vec<User>, generation: u64, fetched_at: DateTime<Utc>) -> Self {
        Self {
            users,
            generation,
            fetched_at,
        }
    }
}

impl<L: LoginApi> Mutation<UsersModule<L>> for SetUsers {
    const NAME: &'static str = Self::NAME;

    fn apply(self, state: &mut UsersState) {
        if self.generation < state.generation {
            warn!(
                "Discarding users fetch #{} superseded by #{}",
                self.generation, state.generation
            );
            return;
        }

        state.users = dedup_by_id(self.users);
        state.generation = self.generation;
        state.last_fetch = Some(self.fetched_at);
        debug!(
            "Users directory now has {} entries (fetch #{})",
            state.users.len(),
            state.generation
        );
    }
}

fn dedup_by_id(mut users: Vec<User>) -> Vec<User> {
    let mut seen = HashSet::with_capacity(users.len());
    users.retain(|user| {
        let fresh = seen.insert(user.id.clone());
        if !fresh {
            warn!("Dropping duplicate user id {:?}", user.id);
        }
        fresh
    });
    users
}

/// Fetches the registered users and replaces the directory with them.
#[derive(Debug, Default)]
pub struct FetchUsers;

impl FetchUsers {
    pub const NAME: &'static str = "fetchUsers";
}

impl<L: LoginApi> Action<UsersModule<L>> for FetchUsers {
    const NAME: &'static str = Self::NAME;

    type Error = ApiError;

    fn run(self, ctx: ActionCtx<UsersModule<L>>) -> ActionFuture<ApiError> {
        let generation = ctx.module().issue_generation();
        Box::pin(async move {
            info!("{}: fetching registered users (fetch #{generation})", ctx.id());

            let users = ctx.module().login().get_registered_users().await?;
            info!("{}: fetched {} users", ctx.id(), users.len());

            ctx.commit(SetUsers::new(users, generation, Utc::now()));
            Ok(())
        })
    }
}

/// Read-only views over [`UsersState`].
#[derive(Debug, Clone, Copy)]
pub struct UsersGetters<'a> {
    state: &'a UsersState,
}

impl<'a> From<&'a UsersState> for UsersGetters<'a> {
    fn from(state: &'a UsersState) -> Self {
        Self { state }
    }
}

impl<'a> UsersGetters<'a> {
    pub fn users(&self) -> &'a [User] {
        &self.state.users
    }

    /// The first user whose id is `name`, or [`EMPTY_USER`].
    pub fn user_by_name(&self, name: &str) -> &'a User {
        self.state
            .users
            .iter()
            .find(|user| user.id == name)
            .unwrap_or(&EMPTY_USER)
    }

    /// Ids in directory order. The iterator is lazy and can be cloned to
    /// start over.
    pub fn user_names(&self) -> impl Iterator<Item = &'a str> + Clone + use<'a> {
        self.state.users.iter().map(|user| user.id.as_str())
    }

    pub fn avatar_by_name(&self, name: &str) -> &'a str {
        &self.user_by_name(name).avatar
    }

    pub fn color_by_name(&self, name: &str) -> &'a str {
        &self.user_by_name(name).color
    }

    pub fn approle_by_name(&self, name: &str) -> &'a str {
        &self.user_by_name(name).approle
    }

    pub fn len(&self) -> usize {
        self.state.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.users.is_empty()
    }

    pub fn last_fetch(&self) -> Option<DateTime<Utc>> {
        self.state.last_fetch
    }
}
