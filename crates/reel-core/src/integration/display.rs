//! Display capabilities the host player exposes to the plugin system.
//!
//! The plugin system never owns the player's display tree.  It queries the
//! host's container for the overlay layer, reads its position and size, and
//! appends a plugin's [`MountElement`] to it:
//!
//! ```rust,ignore
//! if let Some(overlays) = container.query_class(OVERLAYS_CLASS) {
//!     mount.set_position(overlays.position());
//!     overlays.append_child(Arc::clone(&mount));
//! }
//! ```

use std::sync::Arc;

use parking_lot::Mutex;

// =============================================================================
// Marker classes
// =============================================================================

/// Class carried by every plugin mount element.
pub const PLUGIN_CLASS: &str = "reel-plugin";

/// Style-reset class carried by every plugin mount element.
pub const RESET_CLASS: &str = "reel-reset";

/// Class of the host's overlay layer that plugins attach to.
pub const OVERLAYS_CLASS: &str = "reel-overlays";

// =============================================================================
// Position
// =============================================================================

/// Layout offsets of an element, as raw style values (e.g. `"12px"`).
///
/// Unset offsets are `None` and are copied as such.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Position {
    /// Left offset.
    pub left: Option<String>,
    /// Top offset.
    pub top: Option<String>,
}

impl Position {
    /// Creates a position with both offsets set.
    pub fn new(left: impl Into<String>, top: impl Into<String>) -> Self {
        Self {
            left: Some(left.into()),
            top: Some(top.into()),
        }
    }
}

// =============================================================================
// Host display capabilities
// =============================================================================

/// The overlay region of the player that plugin mount elements are appended to.
pub trait DisplayArea: Send + Sync {
    /// Current left/top style of the area.
    fn position(&self) -> Position;

    /// Current content width in pixels.
    fn client_width(&self) -> u32;

    /// Current content height in pixels.
    fn client_height(&self) -> u32;

    /// Appends `element` as a child of the area.
    fn append_child(&self, element: Arc<MountElement>);
}

/// The player's root container, queried for its overlay layer.
pub trait Container: Send + Sync {
    /// Returns the first descendant carrying `class_name`, if any.
    fn query_class(&self, class_name: &str) -> Option<Arc<dyn DisplayArea>>;
}

// =============================================================================
// MountElement
// =============================================================================

/// The element created for a plugin instance to render into.
///
/// Identity (`id`, classes) is fixed at creation; only the position is
/// updated when the instance attaches to the player.
#[derive(Debug)]
pub struct MountElement {
    id: String,
    class_names: Vec<String>,
    position: Mutex<Position>,
}

impl MountElement {
    /// Creates a mount element with the given id and classes.
    pub fn new<I, S>(id: impl Into<String>, class_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            class_names: class_names.into_iter().map(Into::into).collect(),
            position: Mutex::new(Position::default()),
        }
    }

    /// Element id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Classes attached to the element, in creation order.
    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    /// Space-separated class attribute.
    pub fn class_name(&self) -> String {
        self.class_names.join(" ")
    }

    /// Returns `true` if the element carries `class_name`.
    pub fn has_class(&self, class_name: &str) -> bool {
        self.class_names.iter().any(|c| c == class_name)
    }

    /// Current position.
    pub fn position(&self) -> Position {
        self.position.lock().clone()
    }

    /// Overwrites the position.
    pub fn set_position(&self, position: Position) {
        *self.position.lock() = position;
    }
}
