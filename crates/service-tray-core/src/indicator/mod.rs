//! Boundary to the visual indicator (tray icon, menu, notifications).

mod indicator_image;
mod menu_model;

pub use {
    indicator_image::IndicatorImage,
    menu_model::{MenuItemId, MenuLabels, MenuModel, title_for},
};

use std::sync::Arc;

/// Receives display updates from the lifecycle controller.
///
/// Calls are made while the controller lock is held, in the order the state
/// changes were applied. Implementations must only enqueue work (e.g. post to
/// a UI event loop) and must never call back into the controller.
pub trait IndicatorSink: Send + Sync + 'static {
    /// Replace the indicator image.
    fn set_image(&self, image: IndicatorImage);

    /// Replace the indicator title/tooltip.
    fn set_title(&self, title: &str);

    /// Enable or disable a menu item.
    fn set_menu_enabled(&self, item: MenuItemId, enabled: bool);

    /// Replace the text of a menu item.
    fn set_menu_label(&self, _item: MenuItemId, _label: &str) {}

    /// Show a best-effort desktop notification.
    fn notify(&self, title: &str, body: &str);
}

impl<T> IndicatorSink for Arc<T>
where
    T: IndicatorSink,
{
    fn set_image(&self, image: IndicatorImage) {
        (**self).set_image(image);
    }

    fn set_title(&self, title: &str) {
        (**self).set_title(title);
    }

    fn set_menu_enabled(&self, item: MenuItemId, enabled: bool) {
        (**self).set_menu_enabled(item, enabled);
    }

    fn set_menu_label(&self, item: MenuItemId, label: &str) {
        (**self).set_menu_label(item, label);
    }

    fn notify(&self, title: &str, body: &str) {
        (**self).notify(title, body);
    }
}
