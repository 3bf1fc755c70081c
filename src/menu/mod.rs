//! The dropdown menu as plain data.
//!
//! [`build_menu`] turns the current [`PickerState`] into a [`MenuModel`]; the
//! tray renders that model natively and routes clicks back as
//! [`MenuAction`]s (or row signals for the history section).

pub mod dispatch;
pub mod recent;

use crate::color::{ColorFormat, COLOR_SPACE_NAMES};
use crate::icons::STATUS_ICONS;
use crate::settings::{
    magnification_levels, FocusModifier, GridSetting, Settings, MAX_FLOAT_PRECISION,
};
use crate::shortcut::SHORTCUT_PRESETS;
use crate::state::PickerState;

pub use dispatch::{Effects, MenuController, MenuServices};
pub use recent::{RecentRow, RecentRowListener};

pub const APP_NAME: &str = "Pixel Picker";
pub const HISTORY_TITLE: &str = "History";

/// What selecting a menu entry does.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuAction {
    ShowPicker,
    SetStatusIcon(String),
    SetGrid(GridSetting),
    SetColorSpace(Option<String>),
    SetFormat(ColorFormat),
    SetMagnification(u32),
    SetFocusModifier(FocusModifier),
    SetFloatPrecision(u32),
    SetShortcut(Option<String>),
    ToggleUppercase,
    ToggleLaunchAtLogin,
    ToggleWcag,
    ExportLog,
    About,
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuItemSpec {
    pub title: String,
    pub action: MenuAction,
    /// `None` for plain items, `Some(state)` for check items.
    pub checked: Option<bool>,
    /// Name of a status icon shown next to the title.
    pub icon: Option<String>,
}

impl MenuItemSpec {
    fn plain(title: impl Into<String>, action: MenuAction) -> Self {
        Self {
            title: title.into(),
            action,
            checked: None,
            icon: None,
        }
    }

    fn check(title: impl Into<String>, action: MenuAction, checked: bool) -> Self {
        Self {
            title: title.into(),
            action,
            checked: Some(checked),
            icon: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MenuEntry {
    Item(MenuItemSpec),
    /// A disabled caption.
    Header(String),
    Separator,
    Submenu {
        title: String,
        entries: Vec<MenuEntry>,
    },
    Recent(RecentRow),
}

/// Facts the menu shows that are not part of the persisted state.
#[derive(Debug, Clone, Copy, Default)]
pub struct MenuEnvironment {
    pub launch_at_login: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuModel {
    pub entries: Vec<MenuEntry>,
}

impl MenuModel {
    pub fn recent_rows(&self) -> impl Iterator<Item = &RecentRow> {
        self.entries.iter().filter_map(|entry| match entry {
            MenuEntry::Recent(row) => Some(row),
            _ => None,
        })
    }

    pub fn recent_row(&self, index: usize) -> Option<&RecentRow> {
        self.recent_rows().nth(index)
    }

    /// Recomputes every history label and the precision title. Returns the
    /// indices of rows whose label changed.
    pub fn refresh_labels(&mut self, alternate: bool, settings: &Settings) -> Vec<usize> {
        let precision_title = float_precision_title(settings.float_precision);
        let mut changed = Vec::new();
        let mut index = 0;
        for entry in &mut self.entries {
            match entry {
                MenuEntry::Recent(row) => {
                    if row.refresh(alternate, settings) {
                        changed.push(index);
                    }
                    index += 1;
                }
                MenuEntry::Submenu { title, .. } if title.starts_with(FLOAT_PRECISION_PREFIX) => {
                    *title = precision_title.clone();
                }
                _ => {}
            }
        }
        changed
    }
}

pub const FLOAT_PRECISION_PREFIX: &str = "Float Precision";

pub fn float_precision_title(precision: u32) -> String {
    format!("{FLOAT_PRECISION_PREFIX} ({precision})")
}

/// Builds the dropdown from scratch.
pub fn build_menu(state: &PickerState, env: &MenuEnvironment) -> MenuModel {
    let settings = &state.settings;
    let mut entries = Vec::new();

    entries.push(MenuEntry::Item(MenuItemSpec {
        icon: Some(settings.status_item_image.clone()),
        ..MenuItemSpec::plain(APP_NAME, MenuAction::ShowPicker)
    }));

    if !state.recent_picks().is_empty() {
        entries.push(MenuEntry::Separator);
        entries.push(MenuEntry::Header(HISTORY_TITLE.to_string()));
        for pick in state.recent_picks_newest_first() {
            entries.push(MenuEntry::Recent(RecentRow::new(pick.clone(), settings)));
        }
    }

    entries.push(MenuEntry::Separator);
    entries.push(app_icon_menu(settings));
    entries.push(grid_menu(settings));
    entries.push(color_space_menu(settings));
    entries.push(color_format_menu(settings));
    entries.push(magnification_menu(settings));
    entries.push(focus_modifier_menu(settings));
    entries.push(float_precision_menu(settings));
    entries.push(shortcut_menu(settings));
    entries.push(MenuEntry::Item(MenuItemSpec::check(
        "Use Uppercase Hex",
        MenuAction::ToggleUppercase,
        settings.use_uppercase,
    )));
    entries.push(MenuEntry::Item(MenuItemSpec::check(
        format!("Launch {APP_NAME} at Login"),
        MenuAction::ToggleLaunchAtLogin,
        env.launch_at_login,
    )));
    entries.push(MenuEntry::Item(MenuItemSpec::check(
        "Show WCAG Contrast Level",
        MenuAction::ToggleWcag,
        settings.show_wcag_level,
    )));

    entries.push(MenuEntry::Separator);
    entries.push(MenuEntry::Item(MenuItemSpec::plain(
        "Export Log",
        MenuAction::ExportLog,
    )));
    entries.push(MenuEntry::Item(MenuItemSpec::plain("About", MenuAction::About)));
    entries.push(MenuEntry::Item(MenuItemSpec::plain(
        format!("Quit {APP_NAME}"),
        MenuAction::Quit,
    )));

    MenuModel { entries }
}

fn submenu(title: impl Into<String>, entries: Vec<MenuEntry>) -> MenuEntry {
    MenuEntry::Submenu {
        title: title.into(),
        entries,
    }
}

fn app_icon_menu(settings: &Settings) -> MenuEntry {
    let entries = STATUS_ICONS
        .iter()
        .map(|(title, name)| {
            MenuEntry::Item(MenuItemSpec {
                icon: Some(name.to_string()),
                ..MenuItemSpec::check(
                    *title,
                    MenuAction::SetStatusIcon(name.to_string()),
                    settings.status_item_image == *name,
                )
            })
        })
        .collect();
    submenu("App Icon", entries)
}

fn grid_menu(settings: &Settings) -> MenuEntry {
    let entries = GridSetting::WITH_NAMES
        .iter()
        .map(|(title, setting)| {
            MenuEntry::Item(MenuItemSpec::check(
                *title,
                MenuAction::SetGrid(*setting),
                settings.grid_setting == *setting,
            ))
        })
        .collect();
    submenu("Show Grid", entries)
}

fn color_space_menu(settings: &Settings) -> MenuEntry {
    let mut entries = vec![
        MenuEntry::Item(MenuItemSpec::check(
            "Default (Inferred from Screen)",
            MenuAction::SetColorSpace(None),
            settings.color_space.is_none(),
        )),
        MenuEntry::Separator,
    ];
    entries.extend(COLOR_SPACE_NAMES.iter().map(|(title, name)| {
        MenuEntry::Item(MenuItemSpec::check(
            *title,
            MenuAction::SetColorSpace(Some(name.to_string())),
            settings.color_space.as_deref() == Some(*name),
        ))
    }));
    submenu("Color Space", entries)
}

fn color_format_menu(settings: &Settings) -> MenuEntry {
    let entries = ColorFormat::ALL
        .iter()
        .map(|format| {
            MenuEntry::Item(MenuItemSpec::check(
                format.title(),
                MenuAction::SetFormat(*format),
                settings.chosen_format == *format,
            ))
        })
        .collect();
    submenu("Color Format", entries)
}

fn magnification_menu(settings: &Settings) -> MenuEntry {
    let entries = magnification_levels()
        .map(|level| {
            MenuEntry::Item(MenuItemSpec::check(
                format!("{level}x"),
                MenuAction::SetMagnification(level),
                settings.magnification_level == level,
            ))
        })
        .collect();
    submenu("Magnification", entries)
}

fn focus_modifier_menu(settings: &Settings) -> MenuEntry {
    let entries = FocusModifier::WITH_NAMES
        .iter()
        .map(|(title, modifier)| {
            MenuEntry::Item(MenuItemSpec::check(
                *title,
                MenuAction::SetFocusModifier(*modifier),
                settings.focus_mode_modifier == *modifier,
            ))
        })
        .collect();
    submenu("Focus Mode Modifier", entries)
}

fn float_precision_menu(settings: &Settings) -> MenuEntry {
    let entries = (1..=MAX_FLOAT_PRECISION)
        .map(|precision| {
            MenuEntry::Item(MenuItemSpec::check(
                precision.to_string(),
                MenuAction::SetFloatPrecision(precision),
                settings.float_precision == precision,
            ))
        })
        .collect();
    submenu(float_precision_title(settings.float_precision), entries)
}

fn shortcut_menu(settings: &Settings) -> MenuEntry {
    let current = settings.activating_shortcut.as_deref();
    let mut entries = vec![
        MenuEntry::Header(format!("Current: {}", current.unwrap_or("None"))),
        MenuEntry::Separator,
    ];
    entries.extend(SHORTCUT_PRESETS.iter().map(|preset| {
        MenuEntry::Item(MenuItemSpec::check(
            *preset,
            MenuAction::SetShortcut(Some(preset.to_string())),
            current == Some(*preset),
        ))
    }));
    entries.push(MenuEntry::Separator);
    entries.push(MenuEntry::Item(MenuItemSpec::plain(
        "Clear Shortcut",
        MenuAction::SetShortcut(None),
    )));
    submenu("Shortcut", entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Color, PickedColor};

    fn submenu_entries<'a>(model: &'a MenuModel, wanted: &str) -> &'a [MenuEntry] {
        model
            .entries
            .iter()
            .find_map(|entry| match entry {
                MenuEntry::Submenu { title, entries } if title == wanted => Some(entries.as_slice()),
                _ => None,
            })
            .expect(wanted)
    }

    fn items(entries: &[MenuEntry]) -> Vec<&MenuItemSpec> {
        entries
            .iter()
            .filter_map(|entry| match entry {
                MenuEntry::Item(item) => Some(item),
                _ => None,
            })
            .collect()
    }

    fn checked_titles(entries: &[MenuEntry]) -> Vec<String> {
        items(entries)
            .into_iter()
            .filter(|item| item.checked == Some(true))
            .map(|item| item.title.clone())
            .collect()
    }

    fn with_history() -> PickerState {
        PickerState::new(
            Settings {
                chosen_format: ColorFormat::CssHsl,
                ..Settings::default()
            },
            vec![
                PickedColor::new(Color::from_rgb8(255, 0, 0), "ff0000"),
                PickedColor::new(Color::from_rgb8(0, 0, 255), "rgb(0, 0, 255)"),
            ],
        )
    }

    #[test]
    fn empty_history_has_no_history_section() {
        let model = build_menu(&PickerState::default(), &MenuEnvironment::default());
        assert!(matches!(model.entries[0], MenuEntry::Item(ref item) if item.action == MenuAction::ShowPicker));
        assert_eq!(model.entries[1], MenuEntry::Separator);
        assert!(matches!(model.entries[2], MenuEntry::Submenu { ref title, .. } if title == "App Icon"));
        assert_eq!(model.recent_rows().count(), 0);
    }

    #[test]
    fn history_is_listed_newest_first() {
        let model = build_menu(&with_history(), &MenuEnvironment::default());
        assert_eq!(model.entries[1], MenuEntry::Separator);
        assert_eq!(model.entries[2], MenuEntry::Header(HISTORY_TITLE.to_string()));
        let labels: Vec<&str> = model.recent_rows().map(RecentRow::label).collect();
        assert_eq!(labels, vec!["hsl(240, 100%, 50%)", "hsl(0, 100%, 50%)"]);
        assert_eq!(model.entries[5], MenuEntry::Separator);
    }

    #[test]
    fn refresh_applies_alternate_rule() {
        let state = with_history();
        let mut model = build_menu(&state, &MenuEnvironment::default());
        let changed = model.refresh_labels(true, &state.settings);
        assert_eq!(changed, vec![0, 1]);
        let labels: Vec<&str> = model.recent_rows().map(RecentRow::label).collect();
        assert_eq!(labels, vec!["rgb(0, 0, 255)", "ff0000"]);
    }

    #[test]
    fn refresh_updates_precision_title() {
        let mut state = with_history();
        let mut model = build_menu(&state, &MenuEnvironment::default());
        state.settings.float_precision = 5;
        model.refresh_labels(false, &state.settings);
        submenu_entries(&model, "Float Precision (5)");
    }

    #[test]
    fn magnification_lists_even_levels() {
        let model = build_menu(&PickerState::default(), &MenuEnvironment::default());
        let titles: Vec<String> = items(submenu_entries(&model, "Magnification"))
            .into_iter()
            .map(|item| item.title.clone())
            .collect();
        assert_eq!(titles.len(), 11);
        assert_eq!(titles.first().map(String::as_str), Some("4x"));
        assert_eq!(titles.last().map(String::as_str), Some("24x"));
        assert_eq!(checked_titles(submenu_entries(&model, "Magnification")), vec!["8x"]);
    }

    #[test]
    fn each_group_marks_exactly_the_current_value() {
        let mut state = PickerState::default();
        state.settings.grid_setting = GridSetting::Always;
        state.settings.color_space = Some("displayP3".into());
        state.settings.chosen_format = ColorFormat::OpenGl;
        state.settings.focus_mode_modifier = FocusModifier::Shift;
        let model = build_menu(&state, &MenuEnvironment::default());

        assert_eq!(checked_titles(submenu_entries(&model, "Show Grid")), vec!["Always"]);
        assert_eq!(checked_titles(submenu_entries(&model, "Color Space")), vec!["Display P3"]);
        assert_eq!(
            checked_titles(submenu_entries(&model, "Color Format")),
            vec![ColorFormat::OpenGl.title()]
        );
        assert_eq!(
            checked_titles(submenu_entries(&model, "Focus Mode Modifier")),
            vec!["⇧ Shift"]
        );
        assert_eq!(checked_titles(submenu_entries(&model, "App Icon")), vec!["Rainbow"]);
    }

    #[test]
    fn default_color_space_is_checked_when_unset() {
        let model = build_menu(&PickerState::default(), &MenuEnvironment::default());
        assert_eq!(
            checked_titles(submenu_entries(&model, "Color Space")),
            vec!["Default (Inferred from Screen)"]
        );
    }

    #[test]
    fn toggles_and_trailing_actions_are_in_order() {
        let env = MenuEnvironment {
            launch_at_login: true,
        };
        let model = build_menu(&PickerState::default(), &env);
        let actions: Vec<&MenuAction> = items(&model.entries)
            .into_iter()
            .map(|item| &item.action)
            .collect();
        assert_eq!(
            actions,
            vec![
                &MenuAction::ShowPicker,
                &MenuAction::ToggleUppercase,
                &MenuAction::ToggleLaunchAtLogin,
                &MenuAction::ToggleWcag,
                &MenuAction::ExportLog,
                &MenuAction::About,
                &MenuAction::Quit,
            ]
        );
        let login = items(&model.entries)
            .into_iter()
            .find(|item| item.action == MenuAction::ToggleLaunchAtLogin)
            .map(|item| item.checked);
        assert_eq!(login, Some(Some(true)));
    }

    #[test]
    fn submenus_appear_in_fixed_order() {
        let model = build_menu(&PickerState::default(), &MenuEnvironment::default());
        let titles: Vec<&str> = model
            .entries
            .iter()
            .filter_map(|entry| match entry {
                MenuEntry::Submenu { title, .. } => Some(title.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            titles,
            vec![
                "App Icon",
                "Show Grid",
                "Color Space",
                "Color Format",
                "Magnification",
                "Focus Mode Modifier",
                "Float Precision (3)",
                "Shortcut",
            ]
        );
    }
}
