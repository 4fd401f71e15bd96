use serde_json::Value;

/// What could be recovered from the scorer's captured output
#[derive(Debug, Clone, PartialEq)]
pub enum ScorerOutput {
    /// A `recommendations` list, untrimmed and unfiltered
    Recommendations(Vec<String>),
    /// The scorer reported `{"status": "error", ...}`
    ExternalError(String),
    /// No JSON, or JSON of the wrong shape
    Unparseable,
}

const DEFAULT_EXTERNAL_ERROR: &str = "External model reported an error";

/// Extract the scorer result from mixed log/JSON output.
///
/// Lines that look like a JSON object or array are tried in order and the
/// first that parses wins. Failing that, the last non-blank line is tried.
pub fn parse_scorer_output(output: &str) -> ScorerOutput {
    let lines: Vec<&str> = output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let parsed = lines
        .iter()
        .filter(|line| looks_like_json(line))
        .find_map(|line| serde_json::from_str::<Value>(line).ok())
        .or_else(|| {
            lines
                .last()
                .and_then(|line| serde_json::from_str::<Value>(line).ok())
        });

    match parsed {
        Some(value) => interpret(value),
        None => ScorerOutput::Unparseable,
    }
}

fn looks_like_json(line: &str) -> bool {
    (line.starts_with('{') && line.ends_with('}')) || (line.starts_with('[') && line.ends_with(']'))
}

fn interpret(value: Value) -> ScorerOutput {
    let Value::Object(mut object) = value else {
        return ScorerOutput::Unparseable;
    };

    if object.get("status").and_then(Value::as_str) == Some("error") {
        let message = object
            .get("message")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_EXTERNAL_ERROR)
            .to_string();
        return ScorerOutput::ExternalError(message);
    }

    match object.remove("recommendations") {
        Some(list) => match to_string_list(list) {
            Some(items) => ScorerOutput::Recommendations(items),
            None => ScorerOutput::Unparseable,
        },
        None => ScorerOutput::Unparseable,
    }
}

/// Only an array qualifies; a bare string is not a list
fn to_string_list(value: Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => items.into_iter().map(scalar_to_string).collect(),
        _ => None,
    }
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovers_json_from_log_noise() {
        let output = "\
[2024-05-01 10:00:00] INFO: Loading dataset - {'shape': (100, 20)}
[2024-05-01 10:00:01] INFO: Generating career recommendations...
{\"status\":\"success\",\"recommendations\":[\"Data Scientist\",\"Data Analyst\"],\"execution_time\":1.2}
[2024-05-01 10:00:02] INFO: === Recommendation Generation Successful ===";

        assert_eq!(
            parse_scorer_output(output),
            ScorerOutput::Recommendations(vec!["Data Scientist".to_string(), "Data Analyst".to_string()])
        );
    }

    #[test]
    fn test_first_valid_candidate_wins() {
        let output = "{broken json}\n{\"recommendations\":[\"First\"]}\n{\"recommendations\":[\"Second\"]}";

        assert_eq!(
            parse_scorer_output(output),
            ScorerOutput::Recommendations(vec!["First".to_string()])
        );
    }

    #[test]
    fn test_first_parsed_candidate_decides_even_with_wrong_shape() {
        let output = "[1, 2, 3]\n{\"recommendations\":[\"Later\"]}";
        assert_eq!(parse_scorer_output(output), ScorerOutput::Unparseable);
    }

    #[test]
    fn test_last_line_scalar_is_not_a_result() {
        // Parses as JSON on the last-line pass, but carries no list
        let output = "noise\nmore noise\n\"Cloud Engineer\"";
        assert_eq!(parse_scorer_output(output), ScorerOutput::Unparseable);
    }

    #[test]
    fn test_last_line_object_with_trailing_garbage_is_unparseable() {
        let output = "log line\n{\"recommendations\": [\"A\"]} trailing";
        assert_eq!(parse_scorer_output(output), ScorerOutput::Unparseable);
    }

    #[test]
    fn test_error_status_is_reported() {
        let output = "Traceback...\n{\"status\":\"error\",\"message\":\"Dataset is empty\"}";
        assert_eq!(
            parse_scorer_output(output),
            ScorerOutput::ExternalError("Dataset is empty".to_string())
        );
    }

    #[test]
    fn test_error_status_without_message() {
        assert_eq!(
            parse_scorer_output("{\"status\":\"error\"}"),
            ScorerOutput::ExternalError(DEFAULT_EXTERNAL_ERROR.to_string())
        );
    }

    #[test]
    fn test_scalar_entries_are_converted() {
        assert_eq!(
            parse_scorer_output("{\"recommendations\":[\"Role\", 42, true]}"),
            ScorerOutput::Recommendations(vec!["Role".to_string(), "42".to_string(), "true".to_string()])
        );
    }

    #[test]
    fn test_non_array_recommendations_are_unparseable() {
        assert_eq!(
            parse_scorer_output("{\"recommendations\":\"Game Developer\"}"),
            ScorerOutput::Unparseable
        );
        assert_eq!(
            parse_scorer_output("{\"recommendations\":{\"top\":\"Game Developer\"}}"),
            ScorerOutput::Unparseable
        );
    }

    #[test]
    fn test_nested_entries_are_unparseable() {
        assert_eq!(
            parse_scorer_output("{\"recommendations\":[{\"role\":\"x\"}]}"),
            ScorerOutput::Unparseable
        );
    }

    #[test]
    fn test_missing_field_and_empty_output() {
        assert_eq!(parse_scorer_output("{\"status\":\"success\"}"), ScorerOutput::Unparseable);
        assert_eq!(parse_scorer_output(""), ScorerOutput::Unparseable);
        assert_eq!(parse_scorer_output("plain text only"), ScorerOutput::Unparseable);
    }
}
