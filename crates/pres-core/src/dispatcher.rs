//! Request dispatch
//!
//! Builds the `{ requestId, params }` envelope, submits it to the engine for
//! a store and decodes the response.

use std::sync::Arc;

use pres_engine::{NativeEngine, RequestEnvelope, RequestKind};
use pres_store::StoreKey;
use pres_types::PagedResponse;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Error, Result};

/// Sends requests to the engine and validates responses
#[derive(Clone)]
pub struct RequestDispatcher {
    engine: Arc<dyn NativeEngine>,
}

impl RequestDispatcher {
    pub fn new(engine: Arc<dyn NativeEngine>) -> Self {
        Self { engine }
    }

    /// Send a request and return its JSON payload.
    ///
    /// An absent payload and a JSON `null` payload both yield `None`.
    ///
    /// # Errors
    ///
    /// - [`Error::Engine`] when the engine fails the request
    /// - [`Error::Decode`] when the payload is not JSON
    pub async fn send<P>(&self, store: &StoreKey, kind: RequestKind, params: &P) -> Result<Option<Value>>
    where
        P: Serialize + Sync,
    {
        let envelope = RequestEnvelope::new(kind, params).to_json()?;
        tracing::debug!(store = %store, request = %kind, "Dispatching request");

        let response = self
            .engine
            .handle_request(store, &envelope)
            .await
            .map_err(|e| Error::engine(kind, e))?;

        let Some(response) = response else {
            return Ok(None);
        };
        let value: Value = serde_json::from_str(&response).map_err(|source| Error::Decode {
            request: kind.to_string(),
            source,
        })?;
        Ok(match value {
            Value::Null => None,
            value => Some(value),
        })
    }

    /// Send a request and decode its payload, which must be present.
    ///
    /// # Errors
    ///
    /// In addition to the errors of [`send`](Self::send), returns
    /// [`Error::MissingPayload`] when the engine answers with nothing or
    /// `null`.
    pub async fn send_typed<T, P>(&self, store: &StoreKey, kind: RequestKind, params: &P) -> Result<T>
    where
        T: DeserializeOwned,
        P: Serialize + Sync,
    {
        let value = self
            .send(store, kind, params)
            .await?
            .ok_or_else(|| Error::MissingPayload {
                request: kind.to_string(),
            })?;
        decode(kind, value)
    }

    /// Send a request whose payload may legitimately be absent.
    pub async fn send_optional<T, P>(
        &self,
        store: &StoreKey,
        kind: RequestKind,
        params: &P,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned,
        P: Serialize + Sync,
    {
        match self.send(store, kind, params).await? {
            Some(value) => decode(kind, value).map(Some),
            None => Ok(None),
        }
    }

    /// Fetch a page and the total count concurrently.
    ///
    /// Both requests carry the same `params`.
    pub async fn send_paged<T, P>(
        &self,
        store: &StoreKey,
        page_kind: RequestKind,
        count_kind: RequestKind,
        params: &P,
    ) -> Result<PagedResponse<T>>
    where
        T: DeserializeOwned,
        P: Serialize + Sync,
    {
        let (items, total) = join_results(
            tokio::join!(
                self.send_typed::<Vec<T>, P>(store, page_kind, params),
                self.send_typed::<u64, P>(store, count_kind, params),
            ),
        )?;
        Ok(PagedResponse { total, items })
    }
}

/// Combine the halves of a dual fetch.
///
/// A single failure is returned as-is; two failures are reported together.
pub(crate) fn join_results<A, B>(results: (Result<A>, Result<B>)) -> Result<(A, B)> {
    match results {
        (Ok(a), Ok(b)) => Ok((a, b)),
        (Err(e), Ok(_)) | (Ok(_), Err(e)) => Err(e),
        (Err(page), Err(count)) => Err(Error::Paged {
            page: Box::new(page),
            count: Box::new(count),
        }),
    }
}

fn decode<T: DeserializeOwned>(kind: RequestKind, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|source| Error::Decode {
        request: kind.to_string(),
        source,
    })
}
