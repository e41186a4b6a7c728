//! Instance construction and player attachment.
//!
//! [`build_instance`] turns a registered [`PluginHandle`] into a
//! [`PluginInstance`]: it creates the mount element, hands the factory a
//! private copy of the configuration, and wraps the result with
//! attach-to-player and resize-to-area behaviour.  [`configure_plugin`] does
//! the same for the host's own player and stores the instance in the host.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use reel_core::{
    BoxedPlugin, ConfigMap, DisplayArea, MountElement, OVERLAYS_CLASS, PLUGIN_CLASS,
    PluginBehavior, PluginError, PluginResult, RESET_CLASS,
};

use super::handle::PluginHandle;
use super::host::BoxedHostApi;

/// Id of the mount element for plugin `name` in player `host_id`.
pub fn mount_element_id(host_id: &str, name: &str) -> String {
    format!("{host_id}_{name}")
}

// =============================================================================
// PluginInstance
// =============================================================================

/// A live plugin bound to one player.
///
/// Wraps the object the plugin's factory produced.  The wrapper owns the
/// mount element and, once attached, a reference to the display area the
/// element lives in.  A host that stores its instances owns a cycle through
/// them and breaks it by dropping its plugins.
pub struct PluginInstance {
    name: String,
    api: BoxedHostApi,
    mount: Arc<MountElement>,
    plugin: Mutex<BoxedPlugin>,
    display_area: Mutex<Option<Arc<dyn DisplayArea>>>,
}

impl PluginInstance {
    /// Registered name of the plugin.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The element the plugin renders into.
    pub fn mount_element(&self) -> &Arc<MountElement> {
        &self.mount
    }

    /// The display area the instance is attached to, if any.
    pub fn display_area(&self) -> Option<Arc<dyn DisplayArea>> {
        self.display_area.lock().clone()
    }

    /// Returns `true` once [`add_to_player`](Self::add_to_player) found an
    /// overlay layer.
    pub fn is_attached(&self) -> bool {
        self.display_area.lock().is_some()
    }

    /// Attaches the mount element to the player's overlay layer.
    ///
    /// Copies the overlay's left/top onto the mount element, appends the
    /// element to the overlay and records the overlay as this instance's
    /// display area.  Does nothing when the player has no overlay layer yet
    /// or when the instance is already attached.
    pub fn add_to_player(&self) {
        if self.is_attached() {
            debug!(plugin = %self.name, "Plugin already attached");
            return;
        }

        let Some(overlays) = self
            .api
            .container()
            .and_then(|container| container.query_class(OVERLAYS_CLASS))
        else {
            debug!(plugin = %self.name, "No overlay layer, attach skipped");
            return;
        };

        self.mount.set_position(overlays.position());
        overlays.append_child(Arc::clone(&self.mount));
        self.plugin.lock().on_attach(&overlays);
        *self.display_area.lock() = Some(overlays);
        debug!(plugin = %self.name, element = %self.mount.id(), "Plugin attached to player");
    }

    /// Resizes the plugin to its display area's current content size.
    ///
    /// Does nothing if the instance was never attached.
    pub fn resize_handler(&self) {
        let Some(area) = self.display_area() else {
            return;
        };
        let (width, height) = (area.client_width(), area.client_height());
        self.plugin.lock().resize(width, height);
    }

    /// Runs `f` with exclusive access to the wrapped plugin.
    pub fn with_plugin<R>(&self, f: impl FnOnce(&mut dyn PluginBehavior) -> R) -> R {
        let mut plugin = self.plugin.lock();
        f(&mut **plugin)
    }

    /// Runs `f` on the wrapped plugin if it is a `T`.
    pub fn with_plugin_as<T: 'static, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let plugin = self.plugin.lock();
        plugin.as_any().downcast_ref::<T>().map(f)
    }
}

impl fmt::Debug for PluginInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginInstance")
            .field("name", &self.name)
            .field("mount", &self.mount)
            .field("attached", &self.is_attached())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builds a new instance of a registered plugin.
///
/// # Errors
///
/// - [`PluginError::RegistrationMissing`] if the plugin's code never called
///   `register_plugin`.
/// - [`PluginError::Construction`] if the factory fails.
pub fn build_instance(
    handle: &PluginHandle,
    api: BoxedHostApi,
    configuration: &ConfigMap,
    host_id: &str,
) -> PluginResult<Arc<PluginInstance>> {
    let registration = handle
        .registration()
        .ok_or_else(|| PluginError::registration_missing(handle.reference()))?;

    let mount = Arc::new(MountElement::new(
        mount_element_id(host_id, &registration.name),
        [PLUGIN_CLASS, RESET_CLASS],
    ));

    // The factory gets its own copy; the caller's map is never shared.
    let options = configuration.clone();
    let plugin = (registration.factory)(Arc::clone(&api), options, Arc::clone(&mount))
        .map_err(|cause| PluginError::construction(&registration.name, cause))?;

    debug!(
        reference = %handle.reference(),
        plugin    = %registration.name,
        element   = %mount.id(),
        "Plugin instance built"
    );

    Ok(Arc::new(PluginInstance {
        name: registration.name,
        api,
        mount,
        plugin: Mutex::new(plugin),
        display_area: Mutex::new(None),
    }))
}

/// Builds an instance for the host player and stores it in the host.
///
/// The mount element id is derived from the host's own id; the instance is
/// handed to [`HostApi::add_plugin`](super::host::HostApi::add_plugin) under
/// its registered name.
pub fn configure_plugin(
    handle: &PluginHandle,
    plugin_config: &ConfigMap,
    api: BoxedHostApi,
) -> PluginResult<Arc<PluginInstance>> {
    let host_id = api.id().to_owned();
    let instance = build_instance(handle, Arc::clone(&api), plugin_config, &host_id)?;
    api.add_plugin(instance.name(), Arc::clone(&instance));
    Ok(instance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;

    use crate::plugin::host::HostApi;

    use reel_core::{BoxError, Container, Position};
    use serde_json::{Value, json};

    // ─── Fake host ───────────────────────────────────────────────────────────

    struct FakeOverlay {
        position: Position,
        size: Mutex<(u32, u32)>,
        children: Mutex<Vec<Arc<MountElement>>>,
    }

    impl FakeOverlay {
        fn new(width: u32, height: u32) -> Arc<Self> {
            Arc::new(Self {
                position: Position::new("10px", "20px"),
                size: Mutex::new((width, height)),
                children: Mutex::new(Vec::new()),
            })
        }
    }

    impl DisplayArea for FakeOverlay {
        fn position(&self) -> Position {
            self.position.clone()
        }

        fn client_width(&self) -> u32 {
            self.size.lock().0
        }

        fn client_height(&self) -> u32 {
            self.size.lock().1
        }

        fn append_child(&self, element: Arc<MountElement>) {
            self.children.lock().push(element);
        }
    }

    struct FakeContainer {
        overlay: Option<Arc<FakeOverlay>>,
    }

    impl Container for FakeContainer {
        fn query_class(&self, class_name: &str) -> Option<Arc<dyn DisplayArea>> {
            if class_name != OVERLAYS_CLASS {
                return None;
            }
            self.overlay
                .as_ref()
                .map(|o| Arc::clone(o) as Arc<dyn DisplayArea>)
        }
    }

    struct FakeHost {
        container: Option<Arc<FakeContainer>>,
        added: Mutex<Vec<(String, Arc<PluginInstance>)>>,
    }

    impl FakeHost {
        fn with_overlay(overlay: Option<Arc<FakeOverlay>>) -> Arc<Self> {
            Arc::new(Self {
                container: Some(Arc::new(FakeContainer { overlay })),
                added: Mutex::new(Vec::new()),
            })
        }

        fn without_container() -> Arc<Self> {
            Arc::new(Self {
                container: None,
                added: Mutex::new(Vec::new()),
            })
        }
    }

    impl HostApi for FakeHost {
        fn id(&self) -> &str {
            "player"
        }

        fn container(&self) -> Option<Arc<dyn Container>> {
            self.container
                .as_ref()
                .map(|c| Arc::clone(c) as Arc<dyn Container>)
        }

        fn add_plugin(&self, name: &str, instance: Arc<PluginInstance>) {
            self.added.lock().push((name.to_string(), instance));
        }
    }

    // ─── Fake plugin ─────────────────────────────────────────────────────────

    #[derive(Default)]
    struct Recorder {
        config: ConfigMap,
        mount_id: String,
        sizes: Vec<(u32, u32)>,
        attached: bool,
    }

    impl PluginBehavior for Recorder {
        fn resize(&mut self, width: u32, height: u32) {
            self.sizes.push((width, height));
        }

        fn on_attach(&mut self, _area: &Arc<dyn DisplayArea>) {
            self.attached = true;
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn recorder_factory(
        _api: BoxedHostApi,
        mut config: ConfigMap,
        mount: Arc<MountElement>,
    ) -> Result<BoxedPlugin, BoxError> {
        // Mutating the copy must not leak back to the caller.
        config.insert("touched".into(), Value::Bool(true));
        Ok(Box::new(Recorder {
            config,
            mount_id: mount.id().to_string(),
            ..Default::default()
        }))
    }

    fn registered(reference: &str) -> Arc<PluginHandle> {
        let handle = PluginHandle::new(reference);
        handle.register_plugin("recorder", "0.1.0", recorder_factory);
        handle
    }

    fn api(host: &Arc<FakeHost>) -> BoxedHostApi {
        Arc::clone(host) as BoxedHostApi
    }

    // ─── Tests ───────────────────────────────────────────────────────────────

    #[test]
    fn test_build_before_registration_fails() {
        let handle = PluginHandle::new("plugins/foo.js");
        let host = FakeHost::with_overlay(None);

        let err = build_instance(&handle, api(&host), &ConfigMap::new(), "player").unwrap_err();
        assert!(matches!(
            err,
            PluginError::RegistrationMissing { ref reference } if reference == "plugins/foo.js"
        ));
        assert!(err.to_string().contains("plugins/foo.js"));
    }

    #[test]
    fn test_mount_element_identity() {
        let handle = registered("rec.js");
        let host = FakeHost::with_overlay(None);

        let instance = build_instance(&handle, api(&host), &ConfigMap::new(), "main").unwrap();
        let mount = instance.mount_element();
        assert_eq!(mount.id(), "main_recorder");
        assert!(mount.has_class(PLUGIN_CLASS));
        assert!(mount.has_class(RESET_CLASS));
        assert_eq!(instance.name(), "recorder");

        let seen = instance.with_plugin_as(|r: &Recorder| r.mount_id.clone());
        assert_eq!(seen.as_deref(), Some("main_recorder"));
    }

    #[test]
    fn test_configuration_is_copied() {
        let handle = registered("rec.js");
        let host = FakeHost::with_overlay(None);
        let config = match json!({ "color": "red" }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };

        let instance = build_instance(&handle, api(&host), &config, "player").unwrap();

        assert_eq!(config.len(), 1);
        assert!(!config.contains_key("touched"));
        let seen = instance.with_plugin_as(|r: &Recorder| r.config.clone()).unwrap();
        assert_eq!(seen.get("color"), Some(&json!("red")));
        assert_eq!(seen.get("touched"), Some(&json!(true)));
    }

    #[test]
    fn test_each_build_is_independent() {
        let handle = registered("rec.js");
        let host = FakeHost::with_overlay(None);

        let a = build_instance(&handle, api(&host), &ConfigMap::new(), "player").unwrap();
        let b = build_instance(&handle, api(&host), &ConfigMap::new(), "player").unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(a.mount_element(), b.mount_element()));
    }

    #[test]
    fn test_factory_failure_is_construction_error() {
        let handle = PluginHandle::new("bad.js");
        handle.register_plugin("bad", "", |_, _, _| Err("missing skin".into()));
        let host = FakeHost::with_overlay(None);

        let err = build_instance(&handle, api(&host), &ConfigMap::new(), "player").unwrap_err();
        assert!(matches!(err, PluginError::Construction { ref name, .. } if name == "bad"));
    }

    #[test]
    fn test_attach_without_overlay_is_noop() {
        let handle = registered("rec.js");
        for host in [FakeHost::with_overlay(None), FakeHost::without_container()] {
            let instance =
                build_instance(&handle, api(&host), &ConfigMap::new(), "player").unwrap();
            instance.add_to_player();
            assert!(!instance.is_attached());
            assert_eq!(instance.mount_element().position(), Position::default());
        }
    }

    #[test]
    fn test_resize_without_attach_is_noop() {
        let handle = registered("rec.js");
        let host = FakeHost::with_overlay(Some(FakeOverlay::new(640, 360)));

        let instance = build_instance(&handle, api(&host), &ConfigMap::new(), "player").unwrap();
        instance.resize_handler();
        let sizes = instance.with_plugin_as(|r: &Recorder| r.sizes.clone()).unwrap();
        assert!(sizes.is_empty());
    }

    #[test]
    fn test_attach_then_resize() {
        let overlay = FakeOverlay::new(640, 360);
        let handle = registered("rec.js");
        let host = FakeHost::with_overlay(Some(Arc::clone(&overlay)));

        let instance = build_instance(&handle, api(&host), &ConfigMap::new(), "player").unwrap();
        instance.add_to_player();

        assert!(instance.is_attached());
        assert_eq!(instance.mount_element().position(), Position::new("10px", "20px"));
        {
            let children = overlay.children.lock();
            assert_eq!(children.len(), 1);
            assert!(Arc::ptr_eq(&children[0], instance.mount_element()));
        }
        assert_eq!(instance.with_plugin_as(|r: &Recorder| r.attached), Some(true));

        instance.resize_handler();
        *overlay.size.lock() = (1280, 720);
        instance.resize_handler();
        let sizes = instance.with_plugin_as(|r: &Recorder| r.sizes.clone()).unwrap();
        assert_eq!(sizes, vec![(640, 360), (1280, 720)]);
    }

    #[test]
    fn test_attach_when_instance_owns_only_host_reference() {
        let overlay = FakeOverlay::new(640, 360);
        let handle = registered("rec.js");

        let instance = build_instance(
            &handle,
            FakeHost::with_overlay(Some(Arc::clone(&overlay))),
            &ConfigMap::new(),
            "player",
        )
        .unwrap();
        instance.add_to_player();

        assert!(instance.is_attached());
        assert_eq!(overlay.children.lock().len(), 1);
    }

    #[test]
    fn test_attach_twice_appends_once() {
        let overlay = FakeOverlay::new(640, 360);
        let handle = registered("rec.js");
        let host = FakeHost::with_overlay(Some(Arc::clone(&overlay)));

        let instance = build_instance(&handle, api(&host), &ConfigMap::new(), "player").unwrap();
        instance.add_to_player();
        instance.add_to_player();

        assert!(instance.is_attached());
        assert_eq!(overlay.children.lock().len(), 1);
    }

    #[test]
    fn test_configure_plugin_adds_to_host() {
        let handle = registered("rec.js");
        let host = FakeHost::with_overlay(None);

        let instance = configure_plugin(&handle, &ConfigMap::new(), api(&host)).unwrap();

        assert_eq!(instance.mount_element().id(), "player_recorder");
        let added = host.added.lock();
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].0, "recorder");
        assert!(Arc::ptr_eq(&added[0].1, &instance));
    }

    #[test]
    fn test_configure_unregistered_does_not_touch_host() {
        let handle = PluginHandle::new("plugins/foo.js");
        let host = FakeHost::with_overlay(None);

        assert!(configure_plugin(&handle, &ConfigMap::new(), api(&host)).is_err());
        assert!(host.added.lock().is_empty());
    }
}
