//! Plugin handles: one per plugin reference, with load-once semantics.
//!
//! A [`PluginHandle`] moves through the following states:
//!
//! ```text
//! PluginHandle::new() ──► Unresolved
//!        load()       ──► Loading
//!                     ──► Registered  (code ran and called register_plugin)
//!                     ──► Loaded      (code ran, nothing registered)
//!                     ──► LoadFailed  (terminal; never retried)
//! ```
//!
//! The first [`load`](PluginHandle::load) call builds the load operation and
//! caches it before returning, so every later caller (including ones in the
//! same synchronous turn) shares the same operation and the loader runs at
//! most once.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use futures::future::{self, BoxFuture, Shared};
use futures::FutureExt;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use reel_core::{BoxError, BoxedPlugin, ConfigMap, MountElement, PluginError, PluginResult};

use super::host::BoxedHostApi;
use super::loader::BoxedScriptLoader;
use super::path::{PathClass, ResolutionContext, resolve_fetch_target};
use super::version::satisfies_minimum;

/// Constructor registered by plugin code.
///
/// Called with the host api, a private copy of the plugin configuration and
/// the mount element created for the instance.
pub type PluginFactory = Arc<
    dyn Fn(BoxedHostApi, ConfigMap, Arc<MountElement>) -> Result<BoxedPlugin, BoxError>
        + Send
        + Sync,
>;

type SharedLoad = Shared<BoxFuture<'static, PluginResult<()>>>;

// ─── Registration ────────────────────────────────────────────────────────────

/// What a plugin's code registered when it ran.
#[derive(Clone)]
pub struct Registration {
    /// Name the plugin is stored under in the host.
    pub name: String,
    /// Lowest player version the plugin supports.
    pub minimum_version: String,
    /// Instance constructor.
    pub factory: PluginFactory,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("minimum_version", &self.minimum_version)
            .finish_non_exhaustive()
    }
}

// ─── PluginState ─────────────────────────────────────────────────────────────

/// Observable lifecycle state of a [`PluginHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginState {
    /// `load` has never been called.
    Unresolved,
    /// The load operation is pending.
    Loading,
    /// Loaded, but the code never registered a factory.
    Loaded,
    /// Loaded and registered; instances can be built.
    Registered,
    /// The load failed.  Terminal.
    LoadFailed,
}

// ─── PluginHandle ────────────────────────────────────────────────────────────

/// A plugin reference together with its memoized load and registration.
pub struct PluginHandle {
    reference: String,
    path_class: PathClass,
    /// Set at most once, by the first `load` call.
    load: Mutex<Option<SharedLoad>>,
    registration: Mutex<Option<Registration>>,
}

impl PluginHandle {
    /// Creates an unresolved handle for `reference`.
    pub fn new(reference: impl Into<String>) -> Arc<Self> {
        let reference = reference.into();
        let path_class = PathClass::classify(&reference);
        Arc::new(Self {
            reference,
            path_class,
            load: Mutex::new(None),
            registration: Mutex::new(None),
        })
    }

    /// The reference this handle was created for.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Classification of the reference.
    pub fn path_class(&self) -> PathClass {
        self.path_class
    }

    /// Registered plugin name, once the code has registered.
    pub fn name(&self) -> Option<String> {
        self.registration.lock().as_ref().map(|r| r.name.clone())
    }

    /// Registered minimum player version, once the code has registered.
    pub fn minimum_version(&self) -> Option<String> {
        self.registration
            .lock()
            .as_ref()
            .map(|r| r.minimum_version.clone())
    }

    /// Registered factory, once the code has registered.
    pub fn factory(&self) -> Option<PluginFactory> {
        self.registration
            .lock()
            .as_ref()
            .map(|r| Arc::clone(&r.factory))
    }

    /// Snapshot of the full registration.
    pub fn registration(&self) -> Option<Registration> {
        self.registration.lock().clone()
    }

    /// Records the plugin's name, minimum version and factory.
    ///
    /// This is the only way a handle acquires a factory.  It is meant to be
    /// reached from the plugin's own code through a [`PluginRegistrar`]; a
    /// second call replaces the first.
    pub fn register_plugin<F>(
        &self,
        name: impl Into<String>,
        minimum_version: impl Into<String>,
        factory: F,
    ) where
        F: Fn(BoxedHostApi, ConfigMap, Arc<MountElement>) -> Result<BoxedPlugin, BoxError>
            + Send
            + Sync
            + 'static,
    {
        self.register_factory(name.into(), minimum_version.into(), Arc::new(factory));
    }

    fn register_factory(
        &self,
        name: String,
        minimum_version: String,
        factory: PluginFactory,
    ) {
        let mut slot = self.registration.lock();
        if let Some(previous) = slot.as_ref() {
            debug!(
                reference = %self.reference,
                previous  = %previous.name,
                "Plugin registered again, replacing previous registration"
            );
        }
        info!(
            reference       = %self.reference,
            plugin          = %name,
            minimum_version = %minimum_version,
            "Plugin registered"
        );
        *slot = Some(Registration {
            name,
            minimum_version,
            factory,
        });
    }

    /// Returns a registrar that loaded code can use to register this handle.
    pub fn registrar(self: &Arc<Self>) -> PluginRegistrar {
        PluginRegistrar {
            reference: self.reference.clone(),
            handle: Arc::downgrade(self),
        }
    }

    /// Loads the plugin's code, at most once.
    ///
    /// The first call classifies the reference and builds the load operation:
    /// short identifiers resolve immediately without fetching, everything
    /// else is resolved to a fetch target and handed to `loader`.  The
    /// operation is cached before this method returns; every call returns a
    /// [`LoadOperation`] sharing it.
    pub fn load(
        self: &Arc<Self>,
        loader: &BoxedScriptLoader,
        ctx: &ResolutionContext,
    ) -> LoadOperation {
        let inner = self
            .load
            .lock()
            .get_or_insert_with(|| self.start_load(loader, ctx))
            .clone();
        LoadOperation {
            handle: Arc::clone(self),
            inner,
        }
    }

    fn start_load(
        self: &Arc<Self>,
        loader: &BoxedScriptLoader,
        ctx: &ResolutionContext,
    ) -> SharedLoad {
        if self.path_class == PathClass::ShortId {
            debug!(reference = %self.reference, "Short plugin id, nothing to fetch");
            return future::ready(Ok(())).boxed().shared();
        }

        let Some(target) = resolve_fetch_target(&self.reference, ctx) else {
            warn!(reference = %self.reference, "Plugin reference has no fetch target");
            let err = PluginError::Unresolvable {
                reference: self.reference.clone(),
            };
            return future::ready(Err(err)).boxed().shared();
        };

        debug!(reference = %self.reference, target = %target, "Loading plugin script");
        let loader = Arc::clone(loader);
        let registrar = self.registrar();
        async move {
            match loader.fetch(&target, registrar).await {
                Ok(()) => {
                    debug!(target = %target, "Plugin script loaded");
                    Ok(())
                }
                Err(cause) => {
                    warn!(target = %target, error = %cause, "Plugin script failed to load");
                    Err(PluginError::load(target, cause))
                }
            }
        }
        .boxed()
        .shared()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PluginState {
        let load = self.load.lock();
        match load.as_ref().map(Shared::peek) {
            None => PluginState::Unresolved,
            Some(None) => PluginState::Loading,
            Some(Some(Err(_))) => PluginState::LoadFailed,
            Some(Some(Ok(()))) if self.registration.lock().is_some() => PluginState::Registered,
            Some(Some(Ok(()))) => PluginState::Loaded,
        }
    }

    /// Returns `true` if the registered minimum version is satisfied by
    /// `player_version`.  Unregistered handles are considered compatible.
    pub fn is_compatible(&self, player_version: &str) -> bool {
        self.minimum_version()
            .is_none_or(|minimum| satisfies_minimum(&minimum, player_version))
    }
}

impl fmt::Debug for PluginHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginHandle")
            .field("reference", &self.reference)
            .field("path_class", &self.path_class)
            .field("state", &self.state())
            .field("registration", &*self.registration.lock())
            .finish()
    }
}

// ─── PluginRegistrar ─────────────────────────────────────────────────────────

/// Registration callback handed to loaded plugin code.
///
/// Holds only a weak reference, so a pending load never keeps its handle
/// alive on its own.
#[derive(Clone)]
pub struct PluginRegistrar {
    reference: String,
    handle: Weak<PluginHandle>,
}

impl PluginRegistrar {
    /// The reference of the plugin being loaded.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Registers the plugin's name, minimum player version and factory.
    ///
    /// Returns `false` if the handle no longer exists (the host session
    /// ended while the code was loading).
    pub fn register_plugin<F>(
        &self,
        name: impl Into<String>,
        minimum_version: impl Into<String>,
        factory: F,
    ) -> bool
    where
        F: Fn(BoxedHostApi, ConfigMap, Arc<MountElement>) -> Result<BoxedPlugin, BoxError>
            + Send
            + Sync
            + 'static,
    {
        match self.handle.upgrade() {
            Some(handle) => {
                handle.register_plugin(name, minimum_version, factory);
                true
            }
            None => {
                debug!(
                    reference = %self.reference,
                    "Registration for a dropped plugin handle ignored"
                );
                false
            }
        }
    }
}

impl fmt::Debug for PluginRegistrar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistrar")
            .field("reference", &self.reference)
            .finish_non_exhaustive()
    }
}

// ─── LoadOperation ───────────────────────────────────────────────────────────

/// The memoized load of a [`PluginHandle`].
///
/// Resolves to the handle itself once its code has run.  Clones share the
/// same underlying operation; a failure is delivered to every awaiter.
#[derive(Clone)]
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct LoadOperation {
    handle: Arc<PluginHandle>,
    inner: SharedLoad,
}

impl LoadOperation {
    /// The handle being loaded.
    pub fn handle(&self) -> &Arc<PluginHandle> {
        &self.handle
    }

    /// Returns `true` if both values are the same underlying operation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.inner.ptr_eq(&other.inner)
    }
}

impl Future for LoadOperation {
    type Output = PluginResult<Arc<PluginHandle>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        this.inner
            .poll_unpin(cx)
            .map(|res| res.map(|()| Arc::clone(&this.handle)))
    }
}

impl fmt::Debug for LoadOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadOperation")
            .field("reference", &self.handle.reference)
            .field("ready", &self.inner.peek().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use reel_core::PluginBehavior;
    use tokio::sync::oneshot;

    use crate::plugin::loader::ScriptLoader;

    struct Noop;

    impl PluginBehavior for Noop {
        fn resize(&mut self, _width: u32, _height: u32) {}

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn noop_factory(
        _api: BoxedHostApi,
        _config: ConfigMap,
        _mount: Arc<MountElement>,
    ) -> Result<BoxedPlugin, BoxError> {
        Ok(Box::new(Noop))
    }

    /// Loader that counts fetches, optionally waits on a gate, then
    /// registers (or fails).
    struct CountingLoader {
        fetches: AtomicUsize,
        targets: Mutex<Vec<String>>,
        gate: Mutex<Option<oneshot::Receiver<()>>>,
        register: bool,
        fail: bool,
    }

    impl CountingLoader {
        fn new() -> Self {
            Self {
                fetches: AtomicUsize::new(0),
                targets: Mutex::new(Vec::new()),
                gate: Mutex::new(None),
                register: true,
                fail: false,
            }
        }

        fn gated(rx: oneshot::Receiver<()>) -> Self {
            let loader = Self::new();
            *loader.gate.lock() = Some(rx);
            loader
        }
    }

    #[async_trait]
    impl ScriptLoader for CountingLoader {
        async fn fetch(&self, target: &str, registrar: PluginRegistrar) -> Result<(), BoxError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.targets.lock().push(target.to_string());
            let gate = self.gate.lock().take();
            if let Some(rx) = gate {
                let _ = rx.await;
            }
            if self.fail {
                return Err("network error".into());
            }
            if self.register {
                registrar.register_plugin("counter", "0.1.0", noop_factory);
            }
            Ok(())
        }
    }

    fn ctx() -> ResolutionContext {
        ResolutionContext::parse("https://host/app/").unwrap()
    }

    fn boxed(loader: &Arc<CountingLoader>) -> BoxedScriptLoader {
        Arc::clone(loader) as BoxedScriptLoader
    }

    #[test]
    fn test_new_handle_is_unresolved() {
        let handle = PluginHandle::new("plugins/foo.js");
        assert_eq!(handle.reference(), "plugins/foo.js");
        assert_eq!(handle.path_class(), PathClass::Relative);
        assert_eq!(handle.state(), PluginState::Unresolved);
        assert!(handle.factory().is_none());
        assert!(handle.name().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_loads_share_one_fetch() {
        let (tx, rx) = oneshot::channel();
        let loader = Arc::new(CountingLoader::gated(rx));
        let handle = PluginHandle::new("a.js");

        let first = handle.load(&boxed(&loader), &ctx());
        let second = handle.load(&boxed(&loader), &ctx());
        assert!(first.ptr_eq(&second));
        assert_eq!(handle.state(), PluginState::Loading);

        let (a, b, ()) = tokio::join!(first, second, async {
            tokio::task::yield_now().await;
            tx.send(()).unwrap();
        });

        let a = a.unwrap();
        let b = b.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a, &handle));
        assert_eq!(loader.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(*loader.targets.lock(), vec!["https://host/app/a.js".to_string()]);
        assert_eq!(handle.state(), PluginState::Registered);
        assert_eq!(handle.name().as_deref(), Some("counter"));
    }

    #[tokio::test]
    async fn test_load_after_resolution_returns_cached_operation() {
        let loader = Arc::new(CountingLoader::new());
        let handle = PluginHandle::new("https://cdn.example.com/p.js");

        let first = handle.load(&boxed(&loader), &ctx());
        first.clone().await.unwrap();
        let again = handle.load(&boxed(&loader), &ctx());
        assert!(first.ptr_eq(&again));
        again.await.unwrap();

        assert_eq!(loader.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(
            *loader.targets.lock(),
            vec!["https://cdn.example.com/p.js".to_string()]
        );
    }

    #[test]
    fn test_short_id_resolves_without_fetch() {
        let loader = Arc::new(CountingLoader::new());
        let handle = PluginHandle::new("42");

        let resolved = handle.load(&boxed(&loader), &ctx()).now_or_never();
        assert!(matches!(resolved, Some(Ok(_))));
        assert_eq!(loader.fetches.load(Ordering::SeqCst), 0);
        assert_eq!(handle.state(), PluginState::Loaded);
    }

    #[tokio::test]
    async fn test_load_failure_is_shared_and_permanent() {
        let mut loader = CountingLoader::new();
        loader.fail = true;
        let loader = Arc::new(loader);
        let handle = PluginHandle::new("plugins/broken.js");

        let err = handle.load(&boxed(&loader), &ctx()).await.unwrap_err();
        match &err {
            PluginError::Load { target, cause } => {
                assert_eq!(target, "https://host/app/plugins/broken.js");
                assert_eq!(cause.to_string(), "network error");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(handle.state(), PluginState::LoadFailed);

        // No retry: later callers see the same failure, the loader is not re-run.
        let again = handle.load(&boxed(&loader), &ctx()).await;
        assert!(matches!(again, Err(PluginError::Load { .. })));
        assert_eq!(loader.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_load_without_registration_still_succeeds() {
        let mut loader = CountingLoader::new();
        loader.register = false;
        let loader = Arc::new(loader);
        let handle = PluginHandle::new("quiet.js");

        handle.load(&boxed(&loader), &ctx()).await.unwrap();
        assert_eq!(handle.state(), PluginState::Loaded);
        assert!(handle.factory().is_none());
    }

    #[tokio::test]
    async fn test_unresolvable_reference_fails_without_fetch() {
        let loader = Arc::new(CountingLoader::new());
        let opaque = ResolutionContext::parse("data:text/html,player").unwrap();
        let handle = PluginHandle::new("plugins/foo.js");

        let err = handle.load(&boxed(&loader), &opaque).await.unwrap_err();
        assert!(matches!(
            err,
            PluginError::Unresolvable { ref reference } if reference == "plugins/foo.js"
        ));
        assert_eq!(loader.fetches.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_registrar_after_handle_dropped() {
        let handle = PluginHandle::new("gone.js");
        let registrar = handle.registrar();
        assert_eq!(registrar.reference(), "gone.js");
        drop(handle);
        assert!(!registrar.register_plugin("gone", "", noop_factory));
    }

    #[test]
    fn test_register_replaces_previous() {
        let handle = PluginHandle::new("twice.js");
        handle.register_plugin("first", "1.0", noop_factory);
        handle.register_plugin("second", "2.0", noop_factory);
        assert_eq!(handle.name().as_deref(), Some("second"));
        assert_eq!(handle.minimum_version().as_deref(), Some("2.0"));
    }

    #[test]
    fn test_minimum_version_check() {
        let handle = PluginHandle::new("versioned.js");
        assert!(handle.is_compatible("0.0.1"));

        handle.register_plugin("versioned", "1.2.0", noop_factory);
        assert!(handle.is_compatible("1.2.0"));
        assert!(handle.is_compatible("1.10"));
        assert!(!handle.is_compatible("1.1.9"));
    }
}
