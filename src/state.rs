use crate::color::{Color, PickedColor};
use crate::settings::Settings;

/// Preferences plus pick history, shared by the menu and the picker.
///
/// The recent picks are kept in pick order; menus show them newest first.
/// The history has no capacity limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PickerState {
    pub settings: Settings,
    recent_picks: Vec<PickedColor>,
}

impl PickerState {
    pub fn new(settings: Settings, recent_picks: Vec<PickedColor>) -> Self {
        Self {
            settings,
            recent_picks,
        }
    }

    pub fn recent_picks(&self) -> &[PickedColor] {
        &self.recent_picks
    }

    pub fn recent_picks_newest_first(&self) -> impl Iterator<Item = &PickedColor> {
        self.recent_picks.iter().rev()
    }

    /// Records a new pick, capturing it in the currently chosen format.
    pub fn record_pick(&mut self, color: Color) -> &PickedColor {
        let pick = PickedColor::capture(
            color,
            self.settings.chosen_format,
            self.settings.format_options(),
        );
        self.push_recent_pick(pick)
    }

    pub fn push_recent_pick(&mut self, pick: PickedColor) -> &PickedColor {
        self.recent_picks.push(pick);
        &self.recent_picks[self.recent_picks.len() - 1]
    }

    /// Removes the first pick equal to `pick`. Returns whether anything was
    /// removed; a missing pick leaves the history untouched.
    pub fn remove_recent_pick(&mut self, pick: &PickedColor) -> bool {
        match self.recent_picks.iter().position(|p| p == pick) {
            Some(index) => {
                self.recent_picks.remove(index);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PickerState;
    use crate::color::{Color, ColorFormat, PickedColor};

    fn labels(state: &PickerState, alternate: bool) -> Vec<String> {
        state
            .recent_picks_newest_first()
            .map(|pick| state.settings.display_string(pick, alternate))
            .collect()
    }

    fn pick_a() -> PickedColor {
        PickedColor::new(Color::from_rgb8(255, 0, 0), "ff0000")
    }

    fn pick_b() -> PickedColor {
        PickedColor::new(Color::from_rgb8(0, 0, 255), "rgb(0, 0, 255)")
    }

    fn history(picks: &[PickedColor]) -> PickerState {
        PickerState::new(Default::default(), picks.to_vec())
    }

    #[test]
    fn removing_absent_pick_is_a_no_op() {
        let mut state = history(&[pick_a()]);
        let before = state.clone();
        assert!(!state.remove_recent_pick(&pick_b()));
        assert_eq!(state, before);
    }

    #[test]
    fn removing_requires_matching_capture() {
        let mut state = history(&[pick_a()]);
        let same_color = PickedColor::new(pick_a().color, "rgb(255, 0, 0)");
        assert!(!state.remove_recent_pick(&same_color));
        assert_eq!(state.recent_picks().len(), 1);
    }

    #[test]
    fn removing_present_pick_keeps_order() {
        let c = PickedColor::new(Color::from_rgb8(0, 255, 0), "00ff00");
        let mut state = history(&[pick_a(), pick_b(), c.clone()]);
        assert!(state.remove_recent_pick(&pick_b()));
        assert_eq!(state.recent_picks(), &[pick_a(), c]);
    }

    #[test]
    fn removing_duplicate_drops_only_the_first() {
        let mut state = history(&[pick_a(), pick_b(), pick_a()]);
        assert!(state.remove_recent_pick(&pick_a()));
        assert_eq!(state.recent_picks(), &[pick_b(), pick_a()]);
    }

    #[test]
    fn delete_b_from_a_b_leaves_a() {
        let mut state = history(&[pick_a(), pick_b()]);
        state.remove_recent_pick(&pick_b());
        assert_eq!(state.recent_picks(), &[pick_a()]);
    }

    #[test]
    fn labels_are_newest_first_in_current_format() {
        let mut state = history(&[pick_a(), pick_b()]);
        state.settings.chosen_format = ColorFormat::CssHsl;
        assert_eq!(
            labels(&state, false),
            vec!["hsl(240, 100%, 50%)", "hsl(0, 100%, 50%)"]
        );
        assert_eq!(labels(&state, true), vec!["rgb(0, 0, 255)", "ff0000"]);
    }

    #[test]
    fn labels_follow_format_changes() {
        let mut state = history(&[pick_a()]);
        state.settings.chosen_format = ColorFormat::GenericRgb;
        assert_eq!(labels(&state, false), vec!["255, 0, 0"]);
        state.settings.chosen_format = ColorFormat::CssHex;
        assert_eq!(labels(&state, false), vec!["#ff0000"]);
    }

    #[test]
    fn record_pick_captures_current_format() {
        let mut state = PickerState::default();
        state.settings.chosen_format = ColorFormat::CssRgb;
        let pick = state.record_pick(Color::from_rgb8(1, 2, 3)).clone();
        assert_eq!(pick.captured, "rgb(1, 2, 3)");
        state.settings.chosen_format = ColorFormat::GenericHex;
        assert_eq!(labels(&state, true), vec!["rgb(1, 2, 3)"]);
    }
}
