use anyhow::anyhow;
use tauri::AppHandle;
use tauri_plugin_global_shortcut::{Code, GlobalShortcutExt, Modifiers, Shortcut};

use crate::session::ShortcutRegistrar;

/// Shortcuts offered in the menu's shortcut submenu.
#[cfg(target_os = "macos")]
pub const SHORTCUT_PRESETS: [&str; 5] = [
    "Cmd+Shift+P",
    "Cmd+Shift+C",
    "Cmd+Alt+P",
    "Ctrl+Alt+Cmd+P",
    "Ctrl+Shift+C",
];

#[cfg(not(target_os = "macos"))]
pub const SHORTCUT_PRESETS: [&str; 5] = [
    "Ctrl+Shift+P",
    "Ctrl+Shift+C",
    "Ctrl+Alt+P",
    "Ctrl+Alt+Shift+P",
    "Alt+Shift+C",
];

/// Parses strings like `Cmd+Shift+P`. Exactly one non-modifier key is
/// required.
pub fn parse_shortcut(shortcut: &str) -> Option<Shortcut> {
    let s = shortcut.trim().to_lowercase();
    let mut mods = Modifiers::empty();
    let mut code: Option<Code> = None;

    for part in s.split('+').map(|p| p.trim()) {
        match part {
            "ctrl" | "control" => mods |= Modifiers::CONTROL,
            "shift" => mods |= Modifiers::SHIFT,
            "alt" | "option" => mods |= Modifiers::ALT,
            "cmd" | "command" | "super" => mods |= Modifiers::SUPER,
            key => {
                let parsed = key_code_from_token(key)?;
                if code.replace(parsed).is_some() {
                    return None;
                }
            }
        }
    }

    code.map(|c| Shortcut::new(Some(mods), c))
}

/// Registers activation shortcuts with the global-shortcut plugin. Presses
/// are routed by the plugin handler installed in [`crate::run`].
pub struct GlobalShortcuts {
    app: AppHandle,
}

impl GlobalShortcuts {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl ShortcutRegistrar for GlobalShortcuts {
    fn register(&mut self, shortcut: &str) -> anyhow::Result<()> {
        let parsed = parse_shortcut(shortcut)
            .ok_or_else(|| anyhow!("invalid shortcut format: {shortcut}"))?;
        self.app.global_shortcut().register(parsed)?;
        Ok(())
    }

    fn unregister(&mut self, shortcut: &str) -> anyhow::Result<()> {
        let parsed = parse_shortcut(shortcut)
            .ok_or_else(|| anyhow!("invalid shortcut format: {shortcut}"))?;
        self.app.global_shortcut().unregister(parsed)?;
        Ok(())
    }
}

fn key_code_from_token(token: &str) -> Option<Code> {
    match token {
        "a" => Some(Code::KeyA),
        "b" => Some(Code::KeyB),
        "c" => Some(Code::KeyC),
        "d" => Some(Code::KeyD),
        "e" => Some(Code::KeyE),
        "f" => Some(Code::KeyF),
        "g" => Some(Code::KeyG),
        "h" => Some(Code::KeyH),
        "i" => Some(Code::KeyI),
        "j" => Some(Code::KeyJ),
        "k" => Some(Code::KeyK),
        "l" => Some(Code::KeyL),
        "m" => Some(Code::KeyM),
        "n" => Some(Code::KeyN),
        "o" => Some(Code::KeyO),
        "p" => Some(Code::KeyP),
        "q" => Some(Code::KeyQ),
        "r" => Some(Code::KeyR),
        "s" => Some(Code::KeyS),
        "t" => Some(Code::KeyT),
        "u" => Some(Code::KeyU),
        "v" => Some(Code::KeyV),
        "w" => Some(Code::KeyW),
        "x" => Some(Code::KeyX),
        "y" => Some(Code::KeyY),
        "z" => Some(Code::KeyZ),
        "0" => Some(Code::Digit0),
        "1" => Some(Code::Digit1),
        "2" => Some(Code::Digit2),
        "3" => Some(Code::Digit3),
        "4" => Some(Code::Digit4),
        "5" => Some(Code::Digit5),
        "6" => Some(Code::Digit6),
        "7" => Some(Code::Digit7),
        "8" => Some(Code::Digit8),
        "9" => Some(Code::Digit9),
        _ => None,
    }
}
