//! Best-effort scan of embedded expressions for the step inputs they read.
//!
//! This is text matching, not parsing. Every `inputs.<name>` occurrence counts,
//! including ones inside string literals or comments (false positives), and
//! bracket access such as `inputs["name"]` is missed (false negatives).

use regex::Regex;
use std::sync::OnceLock;

static INPUT_REFERENCE: OnceLock<Regex> = OnceLock::new();

fn input_reference() -> &'static Regex {
    INPUT_REFERENCE.get_or_init(|| {
        Regex::new(r"inputs\.(\w+)").expect("input reference pattern is valid")
    })
}

/// Names referenced as `inputs.<name>`, first occurrence order, no repeats.
pub fn referenced_input_names(expression: &str) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for captures in input_reference().captures_iter(expression) {
        if let Some(name) = captures.get(1).map(|m| m.as_str()) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}
