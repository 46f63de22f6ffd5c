use serde::{Deserialize, Serialize};

/// Screen the session is currently showing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Home,
    Learn,
    Review,
    Checklist,
}

/// User actions that move between screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavAction {
    GoHome,
    StartLearning,
    StartReview,
    OpenChecklist,
}

/// Order in which Learn mode walks the word set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearnOrder {
    /// Step through the words in dataset order, wrapping at the end
    #[default]
    Sequential,
    /// Draw a random word each time
    Random,
}

impl NavAction {
    /// Mode this action leads to
    pub fn target(self) -> Mode {
        match self {
            NavAction::GoHome => Mode::Home,
            NavAction::StartLearning => Mode::Learn,
            NavAction::StartReview => Mode::Review,
            NavAction::OpenChecklist => Mode::Checklist,
        }
    }
}

impl Mode {
    /// Apply a navigation action.
    ///
    /// Home offers every screen; every other screen only offers the way back
    /// Home. Re-selecting the current screen is a no-op. Returns `None` when
    /// the action is not offered from this screen.
    pub fn transition(self, action: NavAction) -> Option<Mode> {
        let target = action.target();
        match self {
            Mode::Home => Some(target),
            _ if target == Mode::Home || target == self => Some(target),
            _ => None,
        }
    }

    /// Whether this screen needs a non-empty word set
    pub fn requires_words(self) -> bool {
        matches!(self, Mode::Learn | Mode::Review)
    }
}
