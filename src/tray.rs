//! The status item and the native rendering of the dropdown.
//!
//! A [`MenuModel`] is rendered into a Tauri [`Menu`] whose item ids map back
//! to [`MenuTarget`]s. The menu is popped up from a hidden host window so
//! the session can close as soon as the popup returns.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tauri::image::Image;
use tauri::menu::{
    AboutMetadata, CheckMenuItem, IconMenuItem, IsMenuItem, Menu, MenuEvent, MenuItem,
    PredefinedMenuItem, Submenu,
};
use tauri::tray::{MouseButton, MouseButtonState, TrayIconBuilder, TrayIconEvent};
use tauri::{AppHandle, Manager, Wry};
use tauri_plugin_autostart::ManagerExt;
use tracing::{debug, info, warn};

use crate::clipboard::set_clipboard_text;
use crate::icons::{render_status_icon, ICON_SIZE};
use crate::keyboard::{self, PollingModifierWatcher};
use crate::logging::{export_destination, export_logs, reveal_path, unix_seconds};
use crate::main_thread::{menu_tracking_scheduler, scheduled_refresh};
use crate::menu::recent::SWATCH_SIZE;
use crate::menu::{
    build_menu, float_precision_title, MenuAction, MenuController, MenuEntry, MenuEnvironment,
    MenuItemSpec, MenuModel, MenuServices, RecentRow, APP_NAME, FLOAT_PRECISION_PREFIX,
};
use crate::picker::{OverlayController, PickerController};
use crate::session::StateStore;
use crate::settings::Settings;
use crate::{lock, SharedState};

pub const TRAY_ID: &str = "pixel-picker";
pub const MENU_HOST_WINDOW: &str = "menu-host";

const ID_PREFIX: &str = "pp-";
const REMOVE_FROM_HISTORY: &str = "Remove from History";

/// What a native menu id stands for.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuTarget {
    Action(MenuAction),
    /// Index into the rendered history rows, newest first.
    RowSelect(usize),
    RowDelete(usize),
}

/// The last menu shown, kept alive until the next open. Clicks are delivered
/// after the popup has returned, so the id table must outlive the popup.
pub struct RenderedMenu {
    menu: Menu<Wry>,
    model: MenuModel,
    targets: HashMap<String, MenuTarget>,
    rows: Vec<IconMenuItem<Wry>>,
    delete_items: Vec<MenuItem<Wry>>,
    precision: Option<Submenu<Wry>>,
}

impl RenderedMenu {
    pub fn target(&self, id: &str) -> Option<&MenuTarget> {
        self.targets.get(id)
    }

    /// Re-labels the native history rows, their delete items and the
    /// precision title.
    pub fn refresh_labels(&mut self, alternate: bool, settings: &Settings) {
        for index in self.model.refresh_labels(alternate, settings) {
            let Some(row) = self.model.recent_row(index) else {
                continue;
            };
            if let Some(item) = self.rows.get(index) {
                if let Err(err) = item.set_text(row.label()) {
                    warn!("failed to relabel history row: {err}");
                }
            }
            if let Some(item) = self.delete_items.get(index) {
                if let Err(err) = item.set_text(row.label()) {
                    warn!("failed to relabel history delete item: {err}");
                }
            }
        }
        if let Some(precision) = &self.precision {
            if let Err(err) = precision.set_text(float_precision_title(settings.float_precision)) {
                warn!("failed to retitle float precision: {err}");
            }
        }
    }
}

struct Renderer<'a> {
    app: &'a AppHandle,
    next_id: usize,
    targets: HashMap<String, MenuTarget>,
    rows: Vec<IconMenuItem<Wry>>,
    delete_items: Vec<MenuItem<Wry>>,
    precision: Option<Submenu<Wry>>,
}

impl<'a> Renderer<'a> {
    fn new(app: &'a AppHandle) -> Self {
        Self {
            app,
            next_id: 0,
            targets: HashMap::new(),
            rows: Vec::new(),
            delete_items: Vec::new(),
            precision: None,
        }
    }

    fn fresh_id(&mut self) -> String {
        self.next_id += 1;
        format!("{ID_PREFIX}{}", self.next_id)
    }

    fn bind(&mut self, target: MenuTarget) -> String {
        let id = self.fresh_id();
        self.targets.insert(id.clone(), target);
        id
    }

    fn render_entries(
        &mut self,
        entries: &[MenuEntry],
    ) -> tauri::Result<Vec<Box<dyn IsMenuItem<Wry>>>> {
        let mut items = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            items.push(self.render_entry(entry)?);
            if ends_history(entries, index) {
                items.push(Box::new(self.render_remove_menu(entries)?));
            }
        }
        Ok(items)
    }

    /// One delete item per history row, in row order.
    fn render_remove_menu(&mut self, entries: &[MenuEntry]) -> tauri::Result<Submenu<Wry>> {
        let app = self.app;
        let submenu = Submenu::with_id(app, self.fresh_id(), REMOVE_FROM_HISTORY, true)?;
        let rows: Vec<&RecentRow> = entries
            .iter()
            .filter_map(|entry| match entry {
                MenuEntry::Recent(row) => Some(row),
                _ => None,
            })
            .collect();
        for row in rows {
            let index = self.delete_items.len();
            let item = MenuItem::with_id(
                app,
                self.bind(MenuTarget::RowDelete(index)),
                row.label(),
                true,
                None::<&str>,
            )?;
            submenu.append(&item)?;
            self.delete_items.push(item);
        }
        Ok(submenu)
    }

    fn render_entry(&mut self, entry: &MenuEntry) -> tauri::Result<Box<dyn IsMenuItem<Wry>>> {
        let app = self.app;
        let item: Box<dyn IsMenuItem<Wry>> = match entry {
            MenuEntry::Item(spec) => self.render_item(spec)?,
            MenuEntry::Header(title) => Box::new(MenuItem::with_id(
                app,
                self.fresh_id(),
                title,
                false,
                None::<&str>,
            )?),
            MenuEntry::Separator => Box::new(PredefinedMenuItem::separator(app)?),
            MenuEntry::Submenu { title, entries } => {
                let submenu = Submenu::with_id(app, self.fresh_id(), title, true)?;
                for item in self.render_entries(entries)? {
                    submenu.append(item.as_ref())?;
                }
                if title.starts_with(FLOAT_PRECISION_PREFIX) {
                    self.precision = Some(submenu.clone());
                }
                Box::new(submenu)
            }
            MenuEntry::Recent(row) => {
                let index = self.rows.len();
                let swatch = Image::new_owned(row.swatch().to_vec(), SWATCH_SIZE, SWATCH_SIZE);
                let item = IconMenuItem::with_id(
                    app,
                    self.bind(MenuTarget::RowSelect(index)),
                    row.label(),
                    true,
                    Some(swatch),
                    None::<&str>,
                )?;
                self.rows.push(item.clone());
                Box::new(item)
            }
        };
        Ok(item)
    }

    fn render_item(&mut self, spec: &MenuItemSpec) -> tauri::Result<Box<dyn IsMenuItem<Wry>>> {
        let app = self.app;
        if spec.action == MenuAction::About {
            let metadata = AboutMetadata {
                name: Some(APP_NAME.to_string()),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
                ..Default::default()
            };
            return Ok(Box::new(PredefinedMenuItem::about(
                app,
                Some(spec.title.as_str()),
                Some(metadata),
            )?));
        }

        let id = self.bind(MenuTarget::Action(spec.action.clone()));
        let item: Box<dyn IsMenuItem<Wry>> = match (spec.checked, &spec.icon) {
            (Some(checked), _) => Box::new(CheckMenuItem::with_id(
                app,
                id,
                &spec.title,
                true,
                checked,
                None::<&str>,
            )?),
            (None, Some(icon)) => Box::new(IconMenuItem::with_id(
                app,
                id,
                &spec.title,
                true,
                status_icon_image(icon),
                None::<&str>,
            )?),
            (None, None) => Box::new(MenuItem::with_id(app, id, &spec.title, true, None::<&str>)?),
        };
        Ok(item)
    }
}

pub fn render_menu(app: &AppHandle, model: MenuModel) -> tauri::Result<RenderedMenu> {
    let mut renderer = Renderer::new(app);
    let menu = Menu::new(app)?;
    for item in renderer.render_entries(&model.entries)? {
        menu.append(item.as_ref())?;
    }
    Ok(RenderedMenu {
        menu,
        model,
        targets: renderer.targets,
        rows: renderer.rows,
        delete_items: renderer.delete_items,
        precision: renderer.precision,
    })
}

/// True for the last row of a run of history rows. The delete submenu is
/// rendered right after it.
pub fn ends_history(entries: &[MenuEntry], index: usize) -> bool {
    matches!(entries.get(index), Some(MenuEntry::Recent(_)))
        && !matches!(entries.get(index + 1), Some(MenuEntry::Recent(_)))
}

/// The history row a target refers to, if it is a row target and the row is
/// still in the model.
pub fn target_row<'m>(model: &'m MenuModel, target: &MenuTarget) -> Option<&'m RecentRow> {
    match target {
        MenuTarget::RowSelect(index) | MenuTarget::RowDelete(index) => model.recent_row(*index),
        MenuTarget::Action(_) => None,
    }
}

pub fn status_icon_image(name: &str) -> Option<Image<'static>> {
    render_status_icon(name).map(|rgba| Image::new_owned(rgba, ICON_SIZE, ICON_SIZE))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Picker,
    Dropdown,
}

/// Right click shows the picker and left click the dropdown, unless
/// `left_click_activates` swaps them.
pub fn click_target(button: MouseButton, left_click_activates: bool) -> Option<ClickTarget> {
    match (button, left_click_activates) {
        (MouseButton::Left, false) | (MouseButton::Right, true) => Some(ClickTarget::Dropdown),
        (MouseButton::Right, false) | (MouseButton::Left, true) => Some(ClickTarget::Picker),
        _ => None,
    }
}

pub fn setup_tray(app: &AppHandle, icon_name: &str) -> anyhow::Result<()> {
    let mut tray_builder = TrayIconBuilder::with_id(TRAY_ID)
        .tooltip(APP_NAME)
        .on_tray_icon_event(|tray, event: TrayIconEvent| {
            if let TrayIconEvent::Click {
                button,
                button_state: MouseButtonState::Up,
                ..
            } = event
            {
                handle_tray_click(tray.app_handle(), button);
            }
        });

    if let Some(icon) = status_icon_image(icon_name) {
        tray_builder = tray_builder.icon(icon);
    }

    #[cfg(target_os = "macos")]
    {
        tray_builder = tray_builder.icon_as_template(true);
    }

    tray_builder.build(app).context("failed to create status item")?;
    Ok(())
}

fn handle_tray_click(app: &AppHandle, button: MouseButton) {
    let shared = app.state::<Arc<SharedState>>();
    let left_click_activates = shared
        .picker
        .lock()
        .map(|picker| picker.settings.left_click_activates)
        .unwrap_or(false);

    match click_target(button, left_click_activates) {
        Some(ClickTarget::Picker) => OverlayController::new(app.clone()).show_picker(),
        Some(ClickTarget::Dropdown) => {
            if let Err(err) = open_dropdown(app, &shared) {
                warn!("failed to open menu: {err:#}");
            }
        }
        None => {}
    }
}

/// Builds, renders and pops up the dropdown, then closes the session once
/// the popup returns.
pub fn open_dropdown(app: &AppHandle, shared: &SharedState) -> anyhow::Result<()> {
    let env = MenuEnvironment {
        launch_at_login: launch_at_login_enabled(app),
    };
    let model = {
        let picker = lock(&shared.picker, "picker")?;
        let mut model = build_menu(&picker, &env);
        model.refresh_labels(keyboard::alternate_held(), &picker.settings);
        model
    };

    let rendered = render_menu(app, model).context("failed to render menu")?;
    let menu = rendered.menu.clone();
    *lock(&shared.rendered, "menu")? = Some(rendered);

    {
        let handle = app.clone();
        let on_change = scheduled_refresh(
            menu_tracking_scheduler(app),
            Arc::new(move |alternate: bool| refresh_open_menu(&handle, alternate)),
        );
        lock(&shared.session, "session")?.open(&PollingModifierWatcher::default(), on_change);
    }

    let shown = app
        .get_webview_window(MENU_HOST_WINDOW)
        .context("menu host window missing")
        .and_then(|window| window.popup_menu(&menu).context("failed to show menu"));

    if let Err(err) = close_dropdown(shared) {
        warn!("failed to close menu session: {err:#}");
    }
    shown
}

fn close_dropdown(shared: &SharedState) -> anyhow::Result<()> {
    let picker = lock(&shared.picker, "picker")?;
    let mut session = lock(&shared.session, "session")?;
    let mut storage = lock(&shared.storage, "storage")?;
    session.close(&picker, &mut *storage);
    Ok(())
}

fn refresh_open_menu(app: &AppHandle, alternate: bool) {
    let shared = app.state::<Arc<SharedState>>();
    let Ok(mut rendered) = shared.rendered.lock() else {
        return;
    };
    let Some(rendered) = rendered.as_mut() else {
        return;
    };
    let Ok(picker) = shared.picker.lock() else {
        return;
    };
    rendered.refresh_labels(alternate, &picker.settings);
}

pub fn handle_menu_event(app: &AppHandle, event: &MenuEvent) {
    let shared = app.state::<Arc<SharedState>>();
    if let Err(err) = dispatch_menu_event(app, &shared, event.id().as_ref()) {
        warn!("menu action failed: {err:#}");
    }
}

fn dispatch_menu_event(app: &AppHandle, shared: &SharedState, id: &str) -> anyhow::Result<()> {
    let (target, row) = {
        let rendered = lock(&shared.rendered, "menu")?;
        let Some(target) = rendered.as_ref().and_then(|r| r.target(id)).cloned() else {
            debug!(%id, "no action bound to menu id");
            return Ok(());
        };
        let row = rendered
            .as_ref()
            .and_then(|r| target_row(&r.model, &target))
            .cloned();
        (target, row)
    };

    let alternate = keyboard::alternate_held();
    let mut services = ShellServices::new(app, &shared.log_dir);
    let effects = {
        let mut picker = lock(&shared.picker, "picker")?;
        let mut controller = MenuController::new(&mut picker, &mut services, alternate);
        match (&target, &row) {
            (MenuTarget::Action(action), _) => controller.dispatch(action),
            (MenuTarget::RowSelect(_), Some(row)) => row.pointer_down(&mut controller),
            (MenuTarget::RowDelete(_), Some(row)) => row.activate_delete(&mut controller),
            _ => debug!(%id, "history row no longer exists"),
        }
        let effects = controller.finish();

        if effects.shortcut_changed {
            lock(&shared.session, "session")?
                .shortcut_changed(picker.settings.activating_shortcut.as_deref());
        }
        if effects.state_changed {
            if let Err(err) = lock(&shared.storage, "storage")?.save_state(&picker) {
                warn!("failed to save state: {err:#}");
            }
        }
        effects
    };

    if effects.labels_stale {
        let mut rendered = lock(&shared.rendered, "menu")?;
        if let Some(rendered) = rendered.as_mut() {
            let picker = lock(&shared.picker, "picker")?;
            rendered.refresh_labels(alternate, &picker.settings);
        }
    }

    services.run_deferred();
    Ok(())
}

fn launch_at_login_enabled(app: &AppHandle) -> bool {
    match app.autolaunch().is_enabled() {
        Ok(enabled) => enabled,
        Err(err) => {
            warn!("failed to query launch at login: {err}");
            false
        }
    }
}

/// [`MenuServices`] backed by the running app. Showing the picker and
/// quitting both take the state lock, so they wait for [`run_deferred`].
///
/// [`run_deferred`]: ShellServices::run_deferred
pub struct ShellServices<'a> {
    app: &'a AppHandle,
    log_dir: &'a Path,
    show_picker: bool,
    quit: bool,
}

impl<'a> ShellServices<'a> {
    pub fn new(app: &'a AppHandle, log_dir: &'a Path) -> Self {
        Self {
            app,
            log_dir,
            show_picker: false,
            quit: false,
        }
    }

    pub fn run_deferred(self) {
        if self.show_picker {
            OverlayController::new(self.app.clone()).show_picker();
        }
        if self.quit {
            info!("quitting");
            self.app.exit(0);
        }
    }
}

impl MenuServices for ShellServices<'_> {
    fn show_picker(&mut self) {
        self.show_picker = true;
    }

    fn write_clipboard(&mut self, text: &str) -> anyhow::Result<()> {
        set_clipboard_text(text)
    }

    fn close_menu(&mut self) {
        // Native menus dismiss themselves on click.
        debug!("menu dismissed");
    }

    fn status_icon_changed(&mut self, name: &str) {
        let Some(tray) = self.app.tray_by_id(TRAY_ID) else {
            warn!("status item missing");
            return;
        };
        if let Err(err) = tray.set_icon(status_icon_image(name)) {
            warn!(%name, "failed to change status icon: {err}");
        }
        #[cfg(target_os = "macos")]
        if let Err(err) = tray.set_icon_as_template(true) {
            warn!("failed to mark status icon as template: {err}");
        }
    }

    fn launch_at_login(&self) -> bool {
        launch_at_login_enabled(self.app)
    }

    fn set_launch_at_login(&mut self, enabled: bool) -> anyhow::Result<()> {
        let autolaunch = self.app.autolaunch();
        if enabled {
            autolaunch.enable()?;
        } else {
            autolaunch.disable()?;
        }
        info!(enabled, "launch at login changed");
        Ok(())
    }

    fn export_logs(&mut self) {
        let paths = self.app.path();
        let base = match paths.desktop_dir().or_else(|_| paths.home_dir()) {
            Ok(base) => base,
            Err(err) => {
                warn!("no folder to export logs to: {err}");
                return;
            }
        };
        let destination = export_destination(&base, unix_seconds());
        match export_logs(self.log_dir, &destination) {
            Ok(report) => {
                info!(
                    copied = report.copied.len(),
                    failed = report.failed.len(),
                    "exported logs to {}",
                    report.destination.display()
                );
                if let Err(err) = reveal_path(&report.destination) {
                    warn!("failed to reveal exported logs: {err:#}");
                }
            }
            Err(err) => warn!("failed to export logs: {err:#}"),
        }
    }

    fn show_about(&mut self) {
        // Rendered as the native about item, which opens its own panel.
        debug!("about requested");
    }

    fn quit(&mut self) {
        self.quit = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Color, PickedColor};
    use crate::state::PickerState;

    #[test]
    fn left_click_opens_dropdown_by_default() {
        assert_eq!(click_target(MouseButton::Left, false), Some(ClickTarget::Dropdown));
        assert_eq!(click_target(MouseButton::Right, false), Some(ClickTarget::Picker));
    }

    #[test]
    fn left_click_activates_swaps_buttons() {
        assert_eq!(click_target(MouseButton::Left, true), Some(ClickTarget::Picker));
        assert_eq!(click_target(MouseButton::Right, true), Some(ClickTarget::Dropdown));
    }

    #[test]
    fn middle_click_does_nothing() {
        assert_eq!(click_target(MouseButton::Middle, false), None);
        assert_eq!(click_target(MouseButton::Middle, true), None);
    }

    fn model_with_history(captures: &[&str]) -> MenuModel {
        let mut state = PickerState::default();
        for (shade, captured) in captures.iter().enumerate() {
            state.push_recent_pick(PickedColor::new(
                Color::from_rgb8(shade as u8, 0, 0),
                *captured,
            ));
        }
        build_menu(&state, &MenuEnvironment::default())
    }

    #[test]
    fn row_targets_resolve_newest_first() {
        let model = model_with_history(&["000000", "010000", "020000"]);

        let selected = target_row(&model, &MenuTarget::RowSelect(0)).expect("newest row");
        assert_eq!(selected.pick().captured, "020000");
        let deleted = target_row(&model, &MenuTarget::RowDelete(1)).expect("second row");
        assert_eq!(deleted.pick().captured, "010000");

        assert!(target_row(&model, &MenuTarget::RowDelete(3)).is_none());
        assert!(target_row(&model, &MenuTarget::Action(MenuAction::Quit)).is_none());
    }

    #[test]
    fn delete_menu_follows_the_last_history_row() {
        let model = model_with_history(&["000000", "010000"]);
        let ends: Vec<usize> = (0..model.entries.len())
            .filter(|&index| ends_history(&model.entries, index))
            .collect();
        assert_eq!(ends.len(), 1);
        let last = ends[0];
        assert!(matches!(model.entries[last - 1], MenuEntry::Recent(_)));
        assert!(!matches!(model.entries[last + 1], MenuEntry::Recent(_)));

        let empty = model_with_history(&[]);
        assert!(!(0..empty.entries.len()).any(|index| ends_history(&empty.entries, index)));
    }

    #[test]
    fn every_status_icon_has_an_image() {
        for (_, name) in crate::icons::STATUS_ICONS {
            let image = status_icon_image(name).expect(name);
            assert_eq!(image.width(), ICON_SIZE);
        }
        assert!(status_icon_image("icon-missing").is_none());
    }
}
