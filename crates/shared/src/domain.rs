use serde::{Deserialize, Serialize};

/// Host-assigned identifier for one embedded widget instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WidgetId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractiveType {
    Quiz = 0,
    Poll = 1,
}

impl InteractiveType {
    /// Integer value the backend expects in query parameters.
    pub fn wire_value(self) -> u8 {
        self as u8
    }
}

/// One configured choice. Created at configuration-parse time, immutable
/// afterwards; `index` is stable for the widget's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionRecord {
    pub index: usize,
    pub label: String,
    /// Meaningful for quizzes only; polls carry `false` everywhere.
    #[serde(default)]
    pub is_correct: bool,
}

/// Inclusive bound on how many options a widget may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionBounds {
    pub min: usize,
    pub max: usize,
}

impl Default for OptionBounds {
    fn default() -> Self {
        Self { min: 2, max: 4 }
    }
}

impl OptionBounds {
    pub fn contains(&self, count: usize) -> bool {
        count >= self.min && count <= self.max
    }
}

/// Lifecycle flag for the widget. `Locked` is terminal; the transition
/// happens exactly once, on the first tap or when retrieved aggregate data
/// shows a response from a prior session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionState {
    AwaitingSelection,
    Locked,
}
