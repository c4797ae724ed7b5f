//! # bacev-engine::event::template
//!
//! Message-text rendering for `eventMessageTexts`. Templates are a
//! restricted mini-language: `{name}` looks a value up in the substitution
//! map built from the transition and its notification parameters; unknown
//! names are left verbatim so a misconfigured template stays visible.

use bacev_api::NotificationParameters;
use bacev_types::state::EventState;
use bacev_types::time::TimeStamp;
use indexmap::IndexMap;

/// Builds the name → rendered-value map for one transition. The common
/// entries are always present; the parameter entries are the fields of the
/// notification payload variant.
pub(crate) fn substitution_map(
    new_state: EventState,
    timestamp: TimeStamp,
    parameters: &NotificationParameters,
) -> IndexMap<String, String> {
    let mut map = IndexMap::new();
    map.insert("event_state".to_string(), new_state.to_string());
    map.insert("timestamp".to_string(), timestamp.to_string());

    // The payload variant serializes as { tag: { field: value, … } };
    // flatten the fields into the map.
    if let Ok(serde_json::Value::Object(tagged)) = serde_json::to_value(parameters) {
        for (_tag, fields) in tagged {
            if let serde_json::Value::Object(fields) = fields {
                for (name, value) in fields {
                    map.insert(name, render_json(&value));
                }
            }
        }
    }
    map
}

fn render_json(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Substitutes `{name}` lookups. Unmatched braces and unknown names pass
/// through unchanged.
pub(crate) fn render(template: &str, map: &IndexMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        match tail.find('}') {
            Some(close) => {
                let name = &tail[1..close];
                match map.get(name) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&tail[..=close]),
                }
                rest = &tail[close + 1..];
            }
            None => {
                out.push_str(tail);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bacev_types::primitives::StatusFlags;

    fn map() -> IndexMap<String, String> {
        substitution_map(
            EventState::HighLimit,
            TimeStamp::from_millis(2_000),
            &NotificationParameters::OutOfRange {
                exceeding_value: 101.0,
                status_flags: StatusFlags::default(),
                deadband: 5.0,
                exceeded_limit: 100.0,
            },
        )
    }

    #[test]
    fn common_and_parameter_names_resolve() {
        let map = map();
        assert_eq!(
            render("{event_state} at {timestamp}", &map),
            "high-limit at 2.000000000s"
        );
        assert_eq!(
            render("value {exceeding_value} over {exceeded_limit}", &map),
            "value 101.0 over 100.0"
        );
    }

    #[test]
    fn unknown_names_stay_verbatim() {
        let map = map();
        assert_eq!(render("{nope} {event_state}", &map), "{nope} high-limit");
        assert_eq!(render("dangling {brace", &map), "dangling {brace");
    }
}
