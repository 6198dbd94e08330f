//! Text formatting for node and edge statements.

use serde_json::Value;

pub const BOUNDARY_FILL: &str = "#94DDF4";
pub const EXPRESSION_FILL: &str = "#d3d3d3";
pub const LITERAL_FILL: &str = "#d5aefc";
pub const VALUE_FROM_FILL: &str = "#ffa07a";
pub const DOUBLE_ARROWHEAD: &str = "normalnormal";

/// Ordered `key="value"` pairs. Values are written as given; callers escape
/// label text beforehand.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Props(Vec<(&'static str, String)>);

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &'static str, value: impl Into<String>) {
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn with(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn render(&self) -> String {
        if self.0.is_empty() {
            return String::new();
        }
        let pairs: Vec<String> = self
            .0
            .iter()
            .map(|(key, value)| format!("{key}=\"{value}\""))
            .collect();
        format!("[{}]", pairs.join(", "))
    }
}

pub fn node_statement(dot_id: &str, props: &Props) -> String {
    format!("\"{}\" {};", escape_quoted(dot_id), props.render())
}

pub fn edge_statement(source: &str, target: &str, props: &Props) -> String {
    format!(
        "\"{}\" -> \"{}\" {};",
        escape_quoted(source),
        escape_quoted(target),
        props.render()
    )
}

/// Escapes backslashes and quotes so `text` can sit between double quotes.
/// Literal labels go through [`escape_literal`] instead.
pub fn escape_quoted(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Makes a literal value safe to use as a label.
///
/// Booleans print as `true`/`false`. Strings wrapped in `${...}` or `$(...)`
/// show only the expression body. Everything else is shown as JSON. Quotes
/// and braces are backslash-escaped afterwards, so call this once per value.
pub fn escape_literal(value: &Value) -> String {
    let text = match value {
        Value::Bool(flag) => flag.to_string(),
        Value::String(raw) => match expression_body(raw) {
            Some(body) => body.to_string(),
            None => Value::String(raw.clone()).to_string(),
        },
        other => other.to_string(),
    };

    text.replace('"', "\\\"")
        .replace('{', "\\{")
        .replace('}', "\\}")
}

fn expression_body(raw: &str) -> Option<&str> {
    if raw.len() < 3 {
        return None;
    }
    let delimited = (raw.starts_with("${") && raw.ends_with('}'))
        || (raw.starts_with("$(") && raw.ends_with(')'));
    delimited.then(|| &raw[2..raw.len() - 1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn node_statement_quote_in_id_expected_escaped() {
        let props = Props::new().with("label", escape_quoted("we\"ird"));
        assert_eq!(
            node_statement("file:///wf.cwl#we\"ird#1", &props),
            r#""file:///wf.cwl#we\"ird#1" [label="we\"ird"];"#
        );
        assert_eq!(
            edge_statement("a\\b", "c\"d", &Props::new()),
            r#""a\\b" -> "c\"d" ;"#
        );
    }

    #[test]
    fn escape_literal_expression_delimiters_expected_body_only() {
        assert_eq!(escape_literal(&json!("${x+1}")), "x+1");
        assert_eq!(escape_literal(&json!("$(5)")), "5");
        assert_eq!(
            escape_literal(&json!("${ return {\"a\": 1}; }")),
            " return \\{\\\"a\\\": 1\\}; "
        );
    }

    #[test]
    fn escape_literal_scalars_expected_json_repr() {
        assert_eq!(escape_literal(&json!(true)), "true");
        assert_eq!(escape_literal(&json!(42)), "42");
        assert_eq!(escape_literal(&json!(null)), "null");
        assert_eq!(escape_literal(&json!("plain")), "\\\"plain\\\"");
        assert_eq!(escape_literal(&json!({"k": 1})), "\\{\\\"k\\\":1\\}");
    }

    #[test]
    fn escape_literal_unbalanced_delimiters_expected_repr() {
        assert_eq!(escape_literal(&json!("$(")), "\\\"$(\\\"");
        assert_eq!(escape_literal(&json!("${x)")), "\\\"$\\{x)\\\"");
    }

    #[test]
    fn props_render_insertion_order_expected_overwrite_in_place() {
        let props = Props::new()
            .with("label", "step")
            .with("peripheries", "1")
            .with("label", "renamed");
        assert_eq!(props.render(), "[label=\"renamed\", peripheries=\"1\"]");
        assert_eq!(node_statement("a", &props), "\"a\" [label=\"renamed\", peripheries=\"1\"];");
    }
}
