//! System tray icon with state-based updates.
//!
//! Owns the tray icon, its context menu and the rendered icon cache. Lives on
//! the main thread and is driven only through [`TrayCommand`]s.

use crate::{AppError, AppResult, TrayCommand, badge};

use service_tray_core::{IndicatorImage, MenuItemId, MenuModel, ServiceState};

use std::collections::HashMap;

use tracing::{debug, info, instrument};
use tray_icon::{
    Icon, TrayIcon, TrayIconBuilder,
    menu::{Menu, MenuId, MenuItem, PredefinedMenuItem},
};

/// System tray icon manager.
pub struct TrayManager {
    tray_icon: TrayIcon,
    items: HashMap<MenuItemId, MenuItem>,
    menu_ids: HashMap<MenuId, MenuItemId>,
    icons: HashMap<IndicatorImage, Icon>,
}

impl TrayManager {
    /// Build the tray icon and menu showing `model`.
    #[track_caller]
    #[instrument(skip(model))]
    pub fn new(model: &MenuModel) -> AppResult<Self> {
        let icons = Self::prerender_static()?;

        let menu = Menu::new();
        let mut items = HashMap::new();
        let mut menu_ids = HashMap::new();

        for item in MenuItemId::ALL {
            if matches!(
                item,
                MenuItemId::Toggle | MenuItemId::ShowLastError | MenuItemId::Quit
            ) {
                menu.append(&PredefinedMenuItem::separator())
                    .map_err(|e| AppError::tray(format!("Failed to add separator: {e}")))?;
            }

            let entry = MenuItem::new(model.label(item), model.enabled(item), None);
            menu.append(&entry)
                .map_err(|e| AppError::tray(format!("Failed to add {item:?} menu item: {e}")))?;

            menu_ids.insert(entry.id().clone(), item);
            items.insert(item, entry);
        }

        let icon = icons
            .get(&IndicatorImage::Static(ServiceState::Stopped))
            .cloned()
            .ok_or_else(|| AppError::tray("Missing placeholder icon"))?;

        let tray_icon = TrayIconBuilder::new()
            .with_tooltip(&model.title)
            .with_menu(Box::new(menu))
            .with_icon(icon)
            .build()
            .map_err(|e| AppError::tray(format!("Failed to create tray icon: {e}")))?;

        info!("System tray icon initialized");

        Ok(Self {
            tray_icon,
            items,
            menu_ids,
            icons,
        })
    }

    /// Apply one update from the async side. `Shutdown` is handled by the
    /// event loop and ignored here.
    #[track_caller]
    pub fn apply(&mut self, command: TrayCommand) -> AppResult<()> {
        match command {
            TrayCommand::SetImage(image) => {
                let icon = self.icon_for(image)?;
                self.tray_icon
                    .set_icon(Some(icon))
                    .map_err(|e| AppError::tray(format!("Failed to update icon: {e}")))?;
            }
            TrayCommand::SetTitle(title) => {
                self.tray_icon
                    .set_tooltip(Some(&title))
                    .map_err(|e| AppError::tray(format!("Failed to update tooltip: {e}")))?;
            }
            TrayCommand::SetMenuEnabled(item, enabled) => {
                if let Some(entry) = self.items.get(&item) {
                    entry.set_enabled(enabled);
                }
            }
            TrayCommand::SetMenuLabel(item, label) => {
                if let Some(entry) = self.items.get(&item) {
                    entry.set_text(label);
                }
            }
            TrayCommand::Shutdown => {}
        }

        Ok(())
    }

    /// Menu ids mapped to the items they represent, for event dispatch.
    pub fn menu_ids(&self) -> HashMap<MenuId, MenuItemId> {
        self.menu_ids.clone()
    }

    /// Cached icon for `image`, rendering animation frames on first use.
    #[track_caller]
    fn icon_for(&mut self, image: IndicatorImage) -> AppResult<Icon> {
        if let Some(icon) = self.icons.get(&image) {
            return Ok(icon.clone());
        }

        debug!(?image, "Rendering animation frame");
        let icon = badge::icon(image)?;
        self.icons.insert(image, icon.clone());

        Ok(icon)
    }

    #[track_caller]
    fn prerender_static() -> AppResult<HashMap<IndicatorImage, Icon>> {
        [
            ServiceState::Running,
            ServiceState::Stopped,
            ServiceState::Starting,
            ServiceState::Stopping,
            ServiceState::Error,
        ]
        .into_iter()
        .map(|state| {
            let image = IndicatorImage::Static(state);
            badge::icon(image).map(|icon| (image, icon))
        })
        .collect()
    }
}
