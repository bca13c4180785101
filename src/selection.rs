/// Which country the overlay is showing. Holds the code only; the record is
/// looked up again every time the overlay is rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    Empty,
    Active(String),
}

impl Selection {
    /// Re-selecting replaces the current code; it never toggles back to `Empty`.
    pub fn select_marker(&mut self, code: impl Into<String>) {
        *self = Selection::Active(code.into());
    }

    pub fn dismiss(&mut self) {
        *self = Selection::Empty;
    }

    pub fn active_code(&self) -> Option<&str> {
        match self {
            Selection::Active(code) => Some(code),
            Selection::Empty => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        assert_eq!(Selection::default(), Selection::Empty);
        assert_eq!(Selection::default().active_code(), None);
    }

    #[test]
    fn select_then_dismiss_returns_to_initial() {
        let mut selection = Selection::default();
        selection.select_marker("FRA");
        assert_eq!(selection.active_code(), Some("FRA"));
        selection.dismiss();
        assert_eq!(selection, Selection::default());
    }

    #[test]
    fn reselecting_same_code_does_not_toggle() {
        let mut selection = Selection::default();
        selection.select_marker("FRA");
        selection.select_marker("FRA");
        assert_eq!(selection, Selection::Active("FRA".to_string()));
    }

    #[test]
    fn reselecting_other_code_replaces() {
        let mut selection = Selection::default();
        selection.select_marker("FRA");
        selection.select_marker("DEU");
        assert_eq!(selection.active_code(), Some("DEU"));
    }

    #[test]
    fn dismiss_on_empty_is_noop() {
        let mut selection = Selection::default();
        selection.dismiss();
        assert_eq!(selection, Selection::Empty);
    }
}
