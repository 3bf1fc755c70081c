#![allow(unexpected_cfgs)]

mod clipboard;
mod color;
mod events;
mod icons;
mod keyboard;
mod logging;
mod main_thread;
mod menu;
mod picker;
mod session;
mod settings;
mod shortcut;
mod state;
mod storage;
mod tray;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Context};
use tauri::{AppHandle, Listener, Manager, RunEvent};
use tauri_plugin_autostart::MacosLauncher;
use tauri_plugin_global_shortcut::ShortcutState;
use tracing::{info, warn};

use crate::events::{ColorPickedEvent, PICKER_COLOR_PICKED};
use crate::menu::APP_NAME;
use crate::picker::{handle_color_picked, OverlayController, PickerController};
use crate::session::{MenuSession, StateStore};
use crate::shortcut::GlobalShortcuts;
use crate::state::PickerState;
use crate::storage::Storage;
use crate::tray::RenderedMenu;

const DB_FILE: &str = "pixelpicker.db";

pub struct SharedState {
    pub storage: Mutex<Storage>,
    pub picker: Mutex<PickerState>,
    pub session: Mutex<MenuSession<GlobalShortcuts>>,
    pub rendered: Mutex<Option<RenderedMenu>>,
    pub log_dir: PathBuf,
}

pub(crate) fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> anyhow::Result<MutexGuard<'a, T>> {
    mutex.lock().map_err(|_| anyhow!("{what} lock poisoned"))
}

pub fn run() {
    let app = tauri::Builder::default()
        .plugin(
            tauri_plugin_global_shortcut::Builder::new()
                .with_handler(|app, _shortcut, event| {
                    if event.state() == ShortcutState::Pressed {
                        OverlayController::new(app.clone()).show_picker();
                    }
                })
                .build(),
        )
        .plugin(tauri_plugin_autostart::init(
            MacosLauncher::LaunchAgent,
            Some(vec![]),
        ))
        .on_menu_event(|app, event| tray::handle_menu_event(app, &event))
        .setup(|app| {
            #[cfg(target_os = "macos")]
            app.set_activation_policy(tauri::ActivationPolicy::Accessory);

            start(app.handle())?;
            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application");

    app.run(|app, event| {
        if let RunEvent::Exit = event {
            save_on_exit(app);
        }
    });
}

fn start(app: &AppHandle) -> anyhow::Result<()> {
    let paths = app.path();
    let data_dir = paths
        .app_data_dir()
        .context("failed to resolve app data dir")?;
    let log_dir = paths.app_log_dir().context("failed to resolve app log dir")?;

    let storage = Storage::open(&data_dir.join(DB_FILE))?;
    let state = storage.load_state()?;

    match logging::init_logging(&log_dir, state.settings.debug_mode) {
        Ok(path) => info!(log = %path.display(), "starting {APP_NAME}"),
        Err(err) => eprintln!("file logging unavailable: {err:#}"),
    }

    let shortcut = state.settings.activating_shortcut.clone();
    let icon = state.settings.status_item_image.clone();

    let shared = Arc::new(SharedState {
        storage: Mutex::new(storage),
        picker: Mutex::new(state),
        session: Mutex::new(MenuSession::new(GlobalShortcuts::new(app.clone()))),
        rendered: Mutex::new(None),
        log_dir,
    });
    app.manage(shared.clone());

    tray::setup_tray(app, &icon)?;
    lock(&shared.session, "session")?.register_activating(shortcut.as_deref());

    let handle = app.clone();
    app.listen(PICKER_COLOR_PICKED, move |event| {
        match serde_json::from_str::<ColorPickedEvent>(event.payload()) {
            Ok(picked) => handle_color_picked(&handle.state::<Arc<SharedState>>(), picked),
            Err(err) => warn!("malformed pick event: {err}"),
        }
    });

    Ok(())
}

fn save_on_exit(app: &AppHandle) {
    let Some(shared) = app.try_state::<Arc<SharedState>>() else {
        return;
    };
    let saved = lock(&shared.picker, "picker").and_then(|picker| {
        let mut storage = lock(&shared.storage, "storage")?;
        storage.save_state(&picker)
    });
    match saved {
        Ok(()) => info!("state saved on exit"),
        Err(err) => warn!("failed to save state on exit: {err:#}"),
    }
}
