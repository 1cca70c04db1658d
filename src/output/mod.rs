//! JSON output for CLI commands
//!
//! Every JSON response is wrapped in a [`JsonResponse`] carrying the schema
//! version and an execution id, so consumers can parse output across releases.

use serde::{Deserialize, Serialize};

/// Bumped whenever a response shape changes incompatibly
pub const DEPINDEX_JSON_SCHEMA_VERSION: &str = "1.0.0";

/// Envelope around every JSON payload printed by the CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse<T> {
    /// See [`DEPINDEX_JSON_SCHEMA_VERSION`]
    pub schema_version: String,
    /// Correlates output with log lines from the same invocation
    pub execution_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    /// RFC 3339, seconds precision
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub data: T,
    /// Set when some inputs could not be processed (e.g. files that failed to parse)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial: Option<bool>,
}

impl<T> JsonResponse<T> {
    pub fn new(data: T, execution_id: &str) -> Self {
        JsonResponse {
            schema_version: DEPINDEX_JSON_SCHEMA_VERSION.to_string(),
            execution_id: execution_id.to_string(),
            tool: Some("depindex".to_string()),
            timestamp: Some(chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)),
            data,
            partial: None,
        }
    }

    pub fn with_partial(mut self, partial: bool) -> Self {
        self.partial = Some(partial);
        self
    }
}

/// Printed instead of a [`JsonResponse`] when a command fails
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error category
    pub error: String,
    /// Stable `DEP-*` code, when one applies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
}

/// How command results are rendered on stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Human,
    /// Compact JSON
    Json,
    /// Indented JSON
    Pretty,
}

impl OutputFormat {
    /// Case-insensitive; `text` is accepted as an alias for `human`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "human" | "text" => Some(OutputFormat::Human),
            "json" => Some(OutputFormat::Json),
            "pretty" => Some(OutputFormat::Pretty),
            _ => None,
        }
    }

    pub fn is_json(&self) -> bool {
        !matches!(self, OutputFormat::Human)
    }
}

/// `<unix seconds>-<pid>`, both in hex.
pub fn generate_execution_id() -> String {
    let timestamp = chrono::Utc::now().timestamp().max(0) as u64;
    format!("{:x}-{:x}", timestamp, std::process::id())
}

/// Render `data` as JSON for the given format.
pub fn to_json_string<T: Serialize>(data: &T, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Pretty => serde_json::to_string_pretty(data),
        _ => serde_json::to_string(data),
    }
}

/// Output JSON to stdout
pub fn output_json<T: Serialize>(data: &T, format: OutputFormat) -> anyhow::Result<()> {
    println!("{}", to_json_string(data, format)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_id_format() {
        let id = generate_execution_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 2, "Execution ID should have 2 parts: {}", id);
        for part in parts {
            assert!(u64::from_str_radix(part, 16).is_ok(), "not hex: {}", part);
        }
    }

    #[test]
    fn test_response_envelope() {
        let response = JsonResponse::new(vec!["A", "B"], "abc-1").with_partial(true);
        let json: serde_json::Value =
            serde_json::from_str(&to_json_string(&response, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["schema_version"], DEPINDEX_JSON_SCHEMA_VERSION);
        assert_eq!(json["execution_id"], "abc-1");
        assert_eq!(json["tool"], "depindex");
        assert_eq!(json["data"][1], "B");
        assert_eq!(json["partial"], true);
    }

    #[test]
    fn test_pretty_is_indented() {
        let compact = to_json_string(&vec![1, 2], OutputFormat::Json).unwrap();
        let pretty = to_json_string(&vec![1, 2], OutputFormat::Pretty).unwrap();
        assert_eq!(compact, "[1,2]");
        assert!(pretty.contains('\n'));
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("text"), Some(OutputFormat::Human));
        assert_eq!(OutputFormat::parse("pretty"), Some(OutputFormat::Pretty));
        assert_eq!(OutputFormat::parse("xml"), None);
        assert!(!OutputFormat::Human.is_json());
    }
}
