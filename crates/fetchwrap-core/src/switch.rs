//! Interception switch: routes fetch calls to the mock engine or a real transport.

use crate::error::FetchwrapError;
use crate::mocks::engine::MockEngine;
use crate::types::request::RequestOptions;
use crate::types::response::Response;
use std::future::{ready, Future};
use std::pin::Pin;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::debug;

/// Error of a fetch call routed through a [`FetchSwitch`].
#[derive(Debug, Error)]
pub enum FetchError {
    /// The mock engine rejected the call
    #[error(transparent)]
    Mock(#[from] FetchwrapError),
    /// The real transport failed
    #[error("transport error: {0}")]
    Transport(String),
}

/// Something that answers fetch calls.
///
/// Implemented by real transports and by [`FetchSwitch`] itself, so helpers
/// built on top of fetch accept either.
pub trait Fetch {
    fn fetch(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> impl Future<Output = Result<Response, FetchError>> + Send;
}

/// Transport for builds without network access; every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNetwork;

impl Fetch for NoNetwork {
    async fn fetch(&self, url: &str, _options: RequestOptions) -> Result<Response, FetchError> {
        Err(FetchError::Transport(format!(
            "no network transport configured for {url}"
        )))
    }
}

/// Fetch slot that answers from a [`MockEngine`] while mocking is on and
/// forwards to the wrapped transport otherwise.
///
/// The engine sits behind a mutex so one switch can be shared by reference;
/// the lock is never held across an await point.
#[derive(Debug, Default)]
pub struct FetchSwitch<T = NoNetwork> {
    engine: Mutex<MockEngine>,
    transport: T,
}

impl<T> FetchSwitch<T> {
    /// Switch with mocking turned on and an empty engine.
    pub fn new(transport: T) -> Self {
        Self::with_engine(MockEngine::new(), transport)
    }

    pub fn with_engine(engine: MockEngine, transport: T) -> Self {
        Self {
            engine: Mutex::new(engine),
            transport,
        }
    }

    /// Lock the engine for registration or inspection.
    pub fn engine(&self) -> MutexGuard<'_, MockEngine> {
        // A panic while holding the lock cannot leave the engine half-updated.
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn is_mocking(&self) -> bool {
        self.engine().is_mocking()
    }

    /// Route calls to the mock engine.
    pub fn on(&self) {
        self.engine().on();
        debug!("mocking on");
    }

    /// Route calls to the transport and reset the engine.
    pub fn off(&self) {
        self.engine().off();
        debug!("mocking off");
    }

    pub fn clear(&self) {
        self.engine().clear();
    }

    pub fn into_engine(self) -> MockEngine {
        self.engine
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Future returned by [`FetchSwitch::fetch`] once the call has been routed.
pub type FetchFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Response, FetchError>> + Send + 'a>>;

impl<T: Fetch + Sync> FetchSwitch<T> {
    /// Fetch `url` through the engine or the transport, depending on the switch.
    ///
    /// While mocking is on the mock is consumed by this call, before the
    /// returned future is created, and a rejected call returns its error here.
    /// Only the transport branch does any work when awaited.
    ///
    /// # Errors
    ///
    /// Returns the engine's [`FetchwrapError`] when mocking is on and the call
    /// cannot be answered.
    pub fn fetch<'a>(
        &'a self,
        url: &'a str,
        options: RequestOptions,
    ) -> Result<FetchFuture<'a>, FetchwrapError> {
        let mut engine = self.engine();
        if engine.is_mocking() {
            let response = engine.dispatch(url, &options)?;
            return Ok(Box::pin(ready(Ok(response))));
        }
        drop(engine);

        Ok(Box::pin(self.transport.fetch(url, options)))
    }
}

impl<T: Fetch + Sync> Fetch for FetchSwitch<T> {
    /// Routes the call immediately; an engine error is carried by the future.
    fn fetch(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> impl Future<Output = Result<Response, FetchError>> + Send {
        let routed = FetchSwitch::fetch(self, url, options);
        async move {
            match routed {
                Ok(future) => future.await,
                Err(e) => Err(e.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Transport answering every call with 200 and counting calls.
    #[derive(Default)]
    struct CountingTransport {
        calls: AtomicUsize,
    }

    impl Fetch for CountingTransport {
        async fn fetch(&self, url: &str, _options: RequestOptions) -> Result<Response, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Response::new(200, "OK", url).with_body(r#"{"real":true}"#))
        }
    }

    #[tokio::test]
    async fn test_mocking_on_uses_engine() {
        let switch = FetchSwitch::new(CountingTransport::default());
        switch
            .engine()
            .get("/foo", json!({"foo": "bar"}))
            .expect("register");

        let response = switch
            .fetch("/foo", RequestOptions::new())
            .expect("dispatch")
            .await
            .expect("fetch");
        assert_eq!(response.json::<Value>().expect("json"), json!({"foo": "bar"}));
        assert_eq!(switch.transport().calls.load(Ordering::SeqCst), 0);
        assert_eq!(switch.engine().matches().len(), 1);
    }

    #[tokio::test]
    async fn test_mocking_off_uses_transport() {
        let switch = FetchSwitch::new(CountingTransport::default());
        switch.off();

        let response = switch
            .fetch("/foo", RequestOptions::new())
            .expect("route")
            .await
            .expect("fetch");
        assert_eq!(response.json::<Value>().expect("json"), json!({"real": true}));
        assert_eq!(switch.transport().calls.load(Ordering::SeqCst), 1);
        assert!(switch.engine().matches().is_empty());
    }

    #[rstest]
    fn test_unmatched_mock_fails_at_call_time() {
        let switch = FetchSwitch::new(CountingTransport::default());

        let result = switch.fetch("/nope", RequestOptions::new());
        assert!(matches!(
            result,
            Err(FetchwrapError::UnmatchedRequest { .. })
        ));
        assert!(switch.engine().matches().is_empty());
        assert_eq!(switch.transport().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_calls_consume_mocks_in_call_order() {
        let switch = FetchSwitch::new(CountingTransport::default());
        switch.engine().get("/foo", json!({"n": 1})).expect("register");
        switch.engine().get("/foo", json!({"n": 2})).expect("register");

        let first = switch.fetch("/foo", RequestOptions::new()).expect("first");
        let second = switch.fetch("/foo", RequestOptions::new()).expect("second");
        assert!(switch.engine().pending_entries().is_empty());
        assert_eq!(switch.engine().matches().len(), 2);

        let second = second.await.expect("second response");
        let first = first.await.expect("first response");
        assert_eq!(first.json::<Value>().expect("json"), json!({"n": 1}));
        assert_eq!(second.json::<Value>().expect("json"), json!({"n": 2}));
    }

    #[tokio::test]
    async fn test_trait_fetch_routes_before_await() {
        let switch = FetchSwitch::new(CountingTransport::default());
        switch.engine().get("/foo", json!({"n": 1})).expect("register");

        let pending = Fetch::fetch(&switch, "/foo", RequestOptions::new());
        assert_eq!(switch.engine().matches().len(), 1);
        assert_eq!(pending.await.expect("fetch").status, 200);

        let missing = Fetch::fetch(&switch, "/nope", RequestOptions::new());
        assert!(matches!(
            missing.await,
            Err(FetchError::Mock(FetchwrapError::UnmatchedRequest { .. }))
        ));
        assert_eq!(switch.transport().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_network_transport_fails() {
        let switch = FetchSwitch::<NoNetwork>::default();
        switch.off();
        let result = switch
            .fetch("https://example.com", RequestOptions::new())
            .expect("route")
            .await;
        assert!(matches!(result, Err(FetchError::Transport(msg)) if msg.contains("example.com")));
    }

    #[rstest]
    fn test_off_on_resets_engine() {
        let switch = FetchSwitch::new(NoNetwork);
        assert!(switch.is_mocking());
        switch.engine().get("/foo", json!(200)).expect("register");

        switch.off();
        assert!(!switch.is_mocking());
        switch.on();
        assert!(switch.is_mocking());

        let engine = switch.into_engine();
        assert!(engine.registry().is_empty());
        assert!(engine.matches().is_empty());
    }

    #[rstest]
    fn test_clear_keeps_mocking() {
        let switch = FetchSwitch::new(NoNetwork);
        switch.engine().post("/foo", json!(201)).expect("register");
        switch.clear();
        assert!(switch.is_mocking());
        assert!(switch.engine().pending_entries().is_empty());
    }

    #[tokio::test]
    async fn test_switch_is_usable_through_fetch_trait() {
        async fn call<F: Fetch>(f: &F) -> Result<Response, FetchError> {
            f.fetch("/foo", RequestOptions::new()).await
        }

        let switch = FetchSwitch::new(NoNetwork);
        switch.engine().get("/foo", json!(202)).expect("register");
        let response = call(&switch).await.expect("fetch");
        assert_eq!(response.status, 202);
    }
}
