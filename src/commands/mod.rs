use serde::{Deserialize, Deserializer};
use std::{borrow::Cow, future::Future, pin::Pin, sync::Arc};

use crate::validation::ValidationError;

/// Implements [`tower::Service`] for a request type by delegating to an async handler
///
/// The handler takes the shared database port and the request, and is generic over the port.
macro_rules! command {
    ($request:ty => $response:ty, $handler:ident) => {
        impl<D> tower::Service<$request> for $crate::commands::DomainLogic<D>
        where
            D: $crate::ports::database::DatabasePort + Send + Sync + 'static,
        {
            type Response = $response;
            type Error = $crate::commands::Error;
            type Future = $crate::commands::CommandFuture<$response>;

            fn poll_ready(
                &mut self,
                _cx: &mut std::task::Context<'_>,
            ) -> std::task::Poll<Result<(), Self::Error>> {
                std::task::Poll::Ready(Ok(()))
            }

            fn call(&mut self, req: $request) -> Self::Future {
                Box::pin($handler(self.database.clone(), req))
            }
        }
    };
}

pub mod member;
pub mod sport;
pub mod subscription;

/// Entry point for all club workflows
///
/// Each operation is a request type for which this implements [`tower::Service`].
pub struct DomainLogic<D> {
    database: Arc<D>,
}

impl<D> DomainLogic<D> {
    pub fn new(database: Arc<D>) -> Self {
        Self { database }
    }
}

impl<D> Clone for DomainLogic<D> {
    fn clone(&self) -> Self {
        Self {
            database: self.database.clone(),
        }
    }
}

pub type CommandFuture<T> = Pin<Box<dyn Future<Output = Result<T, Error>> + Send>>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A referenced or targeted record does not exist
    #[error("{0}")]
    NotFound(Cow<'static, str>),

    /// The store rejected a write because of a uniqueness constraint
    #[error("{0}")]
    Conflict(Cow<'static, str>),

    /// Malformed input, or a business rule rejecting the request
    #[error("{0}")]
    InvalidInput(Cow<'static, str>),

    /// Any other store failure, passed through untranslated
    #[error("database port error: {0:?}")]
    Unexpected(#[from] crate::ports::database::Error),
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Self::InvalidInput(err.to_string().into())
    }
}

/// Deserialize a field where `null` and an absent key mean different things
///
/// Use together with `#[serde(default)]`: an absent key stays `None`, `null` becomes
/// `Some(None)`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
