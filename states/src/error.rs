use thiserror::Error;

use crate::QualifiedPath;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Module not registered: {name}, context: {context}")]
    ModuleNotFound {
        name: &'static str,
        context: String,
    },
    #[error("Module already registered: {name}")]
    DuplicateModule { name: &'static str },
    #[error("Path {path} is already declared by module {owner}")]
    DuplicatePath {
        path: QualifiedPath,
        owner: &'static str,
    },
    #[error("Action {path} is not declared by its module")]
    UnknownAction { path: QualifiedPath },
    #[error("Mutation {path} is not declared by its module")]
    UnknownMutation { path: QualifiedPath },
}

impl Error {
    pub fn module_not_found(name: &'static str, context: impl Into<String>) -> Self {
        Self::ModuleNotFound {
            name,
            context: context.into(),
        }
    }
}

/// Outcome of a dispatched action that did not resolve successfully.
///
/// `Rejected` carries the action's own error untouched, so callers can match on
/// the collaborator's failure exactly as it was produced.
#[derive(Debug, Error)]
pub enum DispatchError<E>
where
    E: std::error::Error + 'static,
{
    #[error(transparent)]
    Rejected(E),
    #[error("Action {path} was aborted before it settled")]
    Aborted { path: QualifiedPath },
    #[error(transparent)]
    Store(#[from] Error),
}

impl<E> DispatchError<E>
where
    E: std::error::Error + 'static,
{
    /// Returns the action's own error, if that is why the dispatch failed.
    pub fn rejection(&self) -> Option<&E> {
        match self {
            Self::Rejected(err) => Some(err),
            Self::Aborted { .. } | Self::Store(_) => None,
        }
    }

    pub fn into_rejection(self) -> Option<E> {
        match self {
            Self::Rejected(err) => Some(err),
            Self::Aborted { .. } | Self::Store(_) => None,
        }
    }
}
