//! Brace-balance snippet extraction for SCSS and JS sources.
//!
//! One line-oriented primitive does all the carving: find the first line
//! matching a start predicate, then accumulate lines while tracking the
//! running `{`/`}` balance until it returns to zero. Rule blocks, mixin
//! blocks, script blocks, and legacy-tree splitting all ride on it.
//!
//! A selector that never appears is [`GrowError::NotFound`]; a block
//! that opens but never rebalances is [`GrowError::MalformedSource`].

use std::sync::LazyLock;

use regex::Regex;

use crate::core::error::GrowError;

static BLOCK_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("block comment pattern"));
static LINE_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)//[^\n]*").expect("line comment pattern"));

/// Index of the line where the block opened at `start` closes again.
///
/// Returns `None` when the block never opens a brace or never rebalances;
/// callers treat that as a malformed source.
pub(crate) fn block_end(lines: &[&str], start: usize) -> Option<usize> {
    let mut balance: i64 = 0;
    let mut opened = false;
    for (idx, line) in lines.iter().enumerate().skip(start) {
        let opens = line.matches('{').count() as i64;
        let closes = line.matches('}').count() as i64;
        if opens > 0 {
            opened = true;
        }
        balance += opens - closes;
        if opened && balance <= 0 {
            return Some(idx);
        }
    }
    None
}

fn opener_re(pattern: &str, name: &str) -> Result<Regex, GrowError> {
    Regex::new(pattern).map_err(|_| GrowError::InvalidArgument(name.to_string()))
}

fn malformed(name: &str, reason: &str) -> GrowError {
    GrowError::MalformedSource {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

/// Extract the block starting at the first line whose trimmed text
/// satisfies `start`. Lines are kept verbatim; the result is trimmed.
fn carve_block<F>(text: &str, name: &str, reason: &str, start: F) -> Result<String, GrowError>
where
    F: Fn(&str) -> bool,
{
    let lines: Vec<&str> = text.lines().collect();
    let start_idx = lines
        .iter()
        .position(|line| start(line.trim()))
        .ok_or_else(|| GrowError::NotFound(name.to_string()))?;
    let end = block_end(&lines, start_idx).ok_or_else(|| malformed(name, reason))?;
    Ok(lines[start_idx..=end].join("\n").trim().to_string())
}

/// Extract `.{class_name} { ... }`, prepending any `// @html-*` annotation
/// lines found within the five lines directly above the selector.
pub fn extract_rule_block(text: &str, class_name: &str) -> Result<String, GrowError> {
    let selector = opener_re(
        &format!(r"^\.{}\s*\{{", regex::escape(class_name)),
        class_name,
    )?;
    let lines: Vec<&str> = text.lines().collect();
    let start = lines
        .iter()
        .position(|line| selector.is_match(line.trim()))
        .ok_or_else(|| GrowError::NotFound(class_name.to_string()))?;
    let end =
        block_end(&lines, start).ok_or_else(|| malformed(class_name, "rule block never closes"))?;

    let mut snippet: Vec<&str> = Vec::new();
    for line in &lines[start.saturating_sub(5)..start] {
        if line.trim_start().starts_with("// @html-") {
            snippet.push(line);
        }
    }
    snippet.extend_from_slice(&lines[start..=end]);
    Ok(snippet.join("\n").trim().to_string())
}

/// Remove `/* ... */` and `// ...` comments.
pub fn strip_comments(text: &str) -> String {
    let without_blocks = BLOCK_COMMENT_RE.replace_all(text, "");
    LINE_COMMENT_RE.replace_all(&without_blocks, "").into_owned()
}

/// Extract `@mixin {name}(...) { ... }` from a comment-stripped working
/// copy of the source. Output lines are trimmed.
pub fn extract_mixin_block(text: &str, mixin_name: &str) -> Result<String, GrowError> {
    let cleaned = strip_comments(text);
    let trimmed: String = cleaned
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");
    let opener = opener_re(
        &format!(r"^@mixin\s+{}\s*\(", regex::escape(mixin_name)),
        mixin_name,
    )?;
    carve_block(&trimmed, mixin_name, "mixin block never closes", |line| {
        opener.is_match(line)
    })
}

/// Extract a `function`/`class`/`const` definition from a script source.
pub fn extract_js_component(text: &str, name: &str) -> Result<String, GrowError> {
    let opener = opener_re(
        &format!(
            r"^(?:export\s+)?(?:function|class|const|let)\s+{}\b",
            regex::escape(name)
        ),
        name,
    )?;
    carve_block(text, name, "definition never closes", |line| {
        opener.is_match(line)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUTTONS: &str = r#"
// buttons library

// @html-tag: button
// @html-children: none
.trunk-button {
  padding: 0.5rem 1rem;
  @include sprout-focus-ring();

  &__label {
    font-weight: 600;
  }

  &--md {
    font-size: 1rem;
  }

  @media (min-width: 768px) {
    padding: 0.75rem 1.5rem;
  }
}

.trunk-button-group {
  display: flex;
}
"#;

    #[test]
    fn rule_block_spans_nested_braces_and_media_queries() {
        let code = extract_rule_block(BUTTONS, "trunk-button").unwrap();
        assert!(code.starts_with("// @html-tag: button"));
        assert!(code.contains("&--md"));
        assert!(code.contains("@media (min-width: 768px)"));
        assert!(code.ends_with('}'));
        // The sibling rule stays behind.
        assert!(!code.contains("trunk-button-group"));
    }

    #[test]
    fn rule_block_matches_exact_selector_only() {
        let code = extract_rule_block(BUTTONS, "trunk-button-group").unwrap();
        assert!(code.contains("display: flex"));
        assert!(!code.contains("&--md"));
    }

    #[test]
    fn missing_selector_is_not_found() {
        assert!(matches!(
            extract_rule_block(BUTTONS, "trunk-missing"),
            Err(GrowError::NotFound(name)) if name == "trunk-missing"
        ));
    }

    #[test]
    fn unbalanced_block_is_malformed() {
        let broken = ".oops {\n  color: red;\n"; // never closes
        assert!(matches!(
            extract_rule_block(broken, "oops"),
            Err(GrowError::MalformedSource { name, .. }) if name == "oops"
        ));
    }

    #[test]
    fn single_line_rule_is_a_complete_block() {
        let text = ".badge { color: red; }\n.next { color: blue; }";
        let code = extract_rule_block(text, "badge").unwrap();
        assert_eq!(code, ".badge { color: red; }");
    }

    #[test]
    fn mixin_extraction_strips_comments_first() {
        let text = r#"
/* library header */
@mixin sprout-hover($color) {
  // lifted on hover
  &:hover {
    background: $color;
  }
}
"#;
        let code = extract_mixin_block(text, "sprout-hover").unwrap();
        assert!(code.starts_with("@mixin sprout-hover($color) {"));
        assert!(!code.contains("lifted on hover"));
        assert!(!code.contains("library header"));
    }

    #[test]
    fn mixin_name_is_not_a_prefix_match() {
        let text = "@mixin sprout-hover-strong() {\n  color: red;\n}\n";
        assert!(matches!(
            extract_mixin_block(text, "sprout-hover"),
            Err(GrowError::NotFound(_))
        ));
    }

    #[test]
    fn unclosed_mixin_is_malformed() {
        let text = "@mixin sprout-hover() {\n  color: red;\n";
        assert!(matches!(
            extract_mixin_block(text, "sprout-hover"),
            Err(GrowError::MalformedSource { reason, .. }) if reason == "mixin block never closes"
        ));
    }

    #[test]
    fn js_component_extraction() {
        let text = r#"
const helper = 1;

export function initCarousel(root) {
  const slides = root.querySelectorAll('.slide');
  slides.forEach((s) => {
    s.hidden = true;
  });
}
"#;
        let code = extract_js_component(text, "initCarousel").unwrap();
        assert!(code.starts_with("export function initCarousel"));
        assert!(code.ends_with('}'));
    }

    #[test]
    fn strip_comments_handles_multiline_blocks() {
        let text = "a /* one\ntwo */ b // tail\nc";
        assert_eq!(strip_comments(text), "a  b \nc");
    }
}
