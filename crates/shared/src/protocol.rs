use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{InteractiveType, WidgetId};

/// Per-option response tally. Doubles as the retrieval wire entry and the
/// in-memory aggregate the widget mutates over its lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateEntry {
    pub option_index: usize,
    pub total_count: u64,
    #[serde(default)]
    pub selected_by_user: bool,
}

impl AggregateEntry {
    pub fn zeroed(option_index: usize) -> Self {
        Self {
            option_index,
            total_count: 0,
            selected_by_user: false,
        }
    }
}

/// Success body of the aggregate retrieval request. A response body without
/// the `options` container fails deserialization and is handled as a
/// malformed payload by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatePayload {
    pub options: Vec<AggregateEntry>,
}

/// Analytics record emitted once per user-initiated selection in the
/// current session. Never emitted for selections reconciled from remote
/// aggregate data alone.
#[derive(Debug, Clone, Serialize)]
pub struct SelectionEvent {
    pub widget_id: WidgetId,
    pub interactive_type: InteractiveType,
    pub option_index: usize,
    pub occurred_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_entry_uses_camel_case_wire_fields() {
        let entry: AggregateEntry = serde_json::from_str(
            r#"{"optionIndex": 2, "totalCount": 17, "selectedByUser": true}"#,
        )
        .expect("entry");
        assert_eq!(entry.option_index, 2);
        assert_eq!(entry.total_count, 17);
        assert!(entry.selected_by_user);
    }

    #[test]
    fn selected_by_user_defaults_to_false() {
        let entry: AggregateEntry =
            serde_json::from_str(r#"{"optionIndex": 0, "totalCount": 3}"#).expect("entry");
        assert!(!entry.selected_by_user);
    }

    #[test]
    fn payload_without_options_container_is_rejected() {
        let result = serde_json::from_str::<AggregatePayload>(r#"{"results": []}"#);
        assert!(result.is_err());
    }

    #[test]
    fn payload_with_options_container_parses() {
        let payload: AggregatePayload = serde_json::from_str(
            r#"{"options": [{"optionIndex": 0, "totalCount": 1, "selectedByUser": false}]}"#,
        )
        .expect("payload");
        assert_eq!(payload.options.len(), 1);
    }
}
