use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use serde_json::Value;
use tracing::warn;

use crate::color::{Color, PickedColor, COLOR_SPACE_NAMES};
use crate::icons::is_known_icon;
use crate::session::StateStore;
use crate::settings::{clamp_float_precision, clamp_magnification, Settings};
use crate::shortcut::parse_shortcut;
use crate::state::PickerState;

pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("failed to create db parent directory")?;
        }

        let conn = Connection::open(path).context("failed to open sqlite db")?;
        let mut storage = Self { conn };
        storage.run_migrations()?;
        Ok(storage)
    }

    pub fn run_migrations(&mut self) -> Result<()> {
        self.conn
            .execute_batch(include_str!("migrations/001_init.sql"))
            .context("failed to run migrations")?;
        Ok(())
    }

    pub fn load_state(&self) -> Result<PickerState> {
        let settings = self.load_settings()?;
        let picks = self.load_recent_picks()?;
        Ok(PickerState::new(settings, picks))
    }

    pub fn load_settings(&self) -> Result<Settings> {
        let mut settings = Settings::default();
        let mut stmt = self
            .conn
            .prepare("SELECT key, value_json FROM settings")
            .context("failed to prepare settings query")?;

        let rows = stmt.query_map([], |row| {
            let key: String = row.get(0)?;
            let value: String = row.get(1)?;
            Ok((key, value))
        })?;

        for row in rows {
            let (key, value_json) = row?;
            // Unparseable rows keep the default; only a real JSON null clears.
            match serde_json::from_str::<Value>(&value_json) {
                Ok(value) => apply_setting_value(&mut settings, &key, value),
                Err(err) => warn!(%key, "ignoring unreadable setting: {err}"),
            }
        }

        Ok(settings)
    }

    /// Recent picks in pick order.
    pub fn load_recent_picks(&self) -> Result<Vec<PickedColor>> {
        let mut stmt = self.conn.prepare(
            "SELECT red, green, blue, alpha, captured
             FROM recent_picks
             ORDER BY position ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            let color = Color::new(row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?);
            Ok(PickedColor::new(color, row.get::<_, String>(4)?))
        })?;

        let mut picks = Vec::new();
        for row in rows {
            picks.push(row?);
        }
        Ok(picks)
    }

    pub fn save_settings(&mut self, settings: &Settings) -> Result<()> {
        let tx = self.conn.transaction()?;
        for (key, value) in setting_entries(settings) {
            upsert_setting(&tx, key, &value)?;
        }
        tx.commit().context("failed to save settings")?;
        Ok(())
    }

    pub fn replace_recent_picks(&mut self, picks: &[PickedColor]) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM recent_picks", [])?;
        for (position, pick) in picks.iter().enumerate() {
            tx.execute(
                "INSERT INTO recent_picks(position, red, green, blue, alpha, captured)
                 VALUES(?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    position as i64,
                    pick.color.red,
                    pick.color.green,
                    pick.color.blue,
                    pick.color.alpha,
                    pick.captured,
                ],
            )?;
        }
        tx.commit().context("failed to save recent picks")?;
        Ok(())
    }
}

impl StateStore for Storage {
    fn save_state(&mut self, state: &PickerState) -> Result<()> {
        self.save_settings(&state.settings)?;
        self.replace_recent_picks(state.recent_picks())?;
        Ok(())
    }
}

fn upsert_setting(conn: &Connection, key: &str, value: &Value) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value_json) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json",
        params![key, value.to_string()],
    )?;
    Ok(())
}

/// Every persisted setting as `(key, json value)`.
pub fn setting_entries(settings: &Settings) -> Vec<(&'static str, Value)> {
    vec![
        ("chosen_format", serde_json::json!(settings.chosen_format)),
        ("grid_setting", serde_json::json!(settings.grid_setting)),
        ("color_space", serde_json::json!(settings.color_space)),
        ("magnification_level", serde_json::json!(settings.magnification_level)),
        ("float_precision", serde_json::json!(settings.float_precision)),
        ("status_item_image", serde_json::json!(settings.status_item_image)),
        ("focus_mode_modifier", serde_json::json!(settings.focus_mode_modifier)),
        ("activating_shortcut", serde_json::json!(settings.activating_shortcut)),
        ("use_uppercase", serde_json::json!(settings.use_uppercase)),
        ("show_wcag_level", serde_json::json!(settings.show_wcag_level)),
        ("debug_mode", serde_json::json!(settings.debug_mode)),
        ("left_click_activates", serde_json::json!(settings.left_click_activates)),
    ]
}

pub fn apply_setting_value(settings: &mut Settings, key: &str, value: Value) {
    match key {
        "chosen_format" => {
            if let Ok(v) = serde_json::from_value(value) {
                settings.chosen_format = v;
            }
        }
        "grid_setting" => {
            if let Ok(v) = serde_json::from_value(value) {
                settings.grid_setting = v;
            }
        }
        "color_space" => match value {
            Value::Null => settings.color_space = None,
            Value::String(v) => {
                if COLOR_SPACE_NAMES.iter().any(|(_, name)| *name == v) {
                    settings.color_space = Some(v);
                }
            }
            _ => {}
        },
        "magnification_level" => {
            if let Some(v) = value.as_u64() {
                settings.magnification_level = clamp_magnification(v);
            }
        }
        "float_precision" => {
            if let Some(v) = value.as_u64() {
                settings.float_precision = clamp_float_precision(v);
            }
        }
        "status_item_image" => {
            if let Some(v) = value.as_str() {
                if is_known_icon(v) {
                    settings.status_item_image = v.to_string();
                }
            }
        }
        "focus_mode_modifier" => {
            if let Ok(v) = serde_json::from_value(value) {
                settings.focus_mode_modifier = v;
            }
        }
        "activating_shortcut" => match value {
            Value::Null => settings.activating_shortcut = None,
            Value::String(v) => {
                if parse_shortcut(&v).is_some() {
                    settings.activating_shortcut = Some(v);
                }
            }
            _ => {}
        },
        "use_uppercase" => {
            if let Some(v) = value.as_bool() {
                settings.use_uppercase = v;
            }
        }
        "show_wcag_level" => {
            if let Some(v) = value.as_bool() {
                settings.show_wcag_level = v;
            }
        }
        "debug_mode" => {
            if let Some(v) = value.as_bool() {
                settings.debug_mode = v;
            }
        }
        "left_click_activates" => {
            if let Some(v) = value.as_bool() {
                settings.left_click_activates = v;
            }
        }
        _ => {}
    }
}
