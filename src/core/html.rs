//! HTML structure inference from extracted SCSS components.
//!
//! Tag resolution is a four-stage chain, most explicit first: an
//! `// @html-tag:` annotation, the ordered naming-convention table, a
//! CSS property heuristic, then a broad fallback dictionary ending in
//! `div`. Child generation is opt-in via `// @html-children:`;
//! variations always render as flat siblings.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use tracing::warn;

use crate::core::tree::InsertStatus;

pub const TRUNKS_HOST_BANNER: &str = "<!-- 🌳 TRUNKS SECTION -->";
pub const LEAFS_HOST_BANNER: &str = "<!-- 🍃 LEAFS SECTION -->";

static TAG_ANNOTATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"// @html-tag:\s*(\w+)").expect("tag annotation pattern"));
static CHILDREN_ANNOTATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"// @html-children:\s*(\S+)").expect("children annotation pattern")
});
static OPEN_SELECTOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^{}]+)\{").expect("open selector pattern"));

/// Naming-convention tag table, scanned in order; substring match.
const NAMING_TAGS: &[(&str, &str)] = &[
    ("btn-", "button"),
    ("button-", "button"),
    ("grid-", "section"),
    ("card-", "article"),
    ("form-", "form"),
    ("nav-", "nav"),
    ("header-", "header"),
    ("footer-", "footer"),
    ("aside-", "aside"),
    ("main-", "main"),
    ("modal-", "dialog"),
    ("menu-", "nav"),
    ("list-", "ul"),
    ("item-", "li"),
    ("link-", "a"),
    ("anchor-", "a"),
    ("image-", "img"),
    ("img-", "img"),
    ("input-", "input"),
    ("select-", "select"),
    ("textarea-", "textarea"),
    ("table-", "table"),
    ("row-", "tr"),
    ("cell-", "td"),
    ("heading-", "h1"),
    ("title-", "h1"),
    ("paragraph-", "p"),
    ("text-", "p"),
    ("-btn", "button"),
    ("-button", "button"),
    ("-grid", "section"),
    ("-card", "article"),
    ("-form", "form"),
    ("-nav", "nav"),
    ("-header", "header"),
    ("-footer", "footer"),
    ("-aside", "aside"),
    ("-main", "main"),
    ("-modal", "dialog"),
    ("-menu", "nav"),
    ("-list", "ul"),
    ("-item", "li"),
    ("-link", "a"),
    ("-anchor", "a"),
    ("-image", "img"),
    ("-img", "img"),
    ("-input", "input"),
    ("-select", "select"),
    ("-textarea", "textarea"),
    ("-table", "table"),
    ("-row", "tr"),
    ("-cell", "td"),
    ("-heading", "h1"),
    ("-title", "h1"),
    ("-paragraph", "p"),
    ("-text", "p"),
];

/// Placeholder contents for well-known child names.
const CHILD_CONTENT: &[(&str, &str)] = &[
    ("text", "Text content"),
    ("title", "Title"),
    ("label", "Label"),
    ("content", "Content goes here"),
    ("body", "Body content"),
    ("header", "Header"),
    ("footer", "Footer"),
    ("actions", "Action"),
    ("icon", "Icon"),
    ("description", "Description"),
    ("subtitle", "Subtitle"),
];

/// What structure analysis learned from a component's SCSS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScssStructure {
    pub base_class: String,
    pub children: Vec<String>,
    pub variations: Vec<String>,
}

/// Walk the snippet tracking brace depth and classify each selector as
/// the base rule, a `__child`, or a `--variation`.
pub fn analyze_structure(scss: &str, component_name: &str) -> ScssStructure {
    let mut structure = ScssStructure {
        base_class: component_name.to_string(),
        children: Vec::new(),
        variations: Vec::new(),
    };
    let base_selector = format!(".{component_name}");
    let child_marker = format!(".{component_name}__");
    let variation_marker = format!("{component_name}--");

    let mut depth: i64 = 0;
    for raw in scss.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with("//") || line.starts_with("/*") {
            continue;
        }
        depth += line.matches('{').count() as i64;
        depth -= line.matches('}').count() as i64;

        let Some(caps) = OPEN_SELECTOR_RE.captures(line) else {
            continue;
        };
        let selector = caps[1].trim();

        if selector == base_selector {
            continue;
        }

        if selector.starts_with("&__") || selector.contains(&child_marker) {
            let child = selector
                .trim_start_matches("&__")
                .trim_start_matches(&child_marker)
                .split(' ')
                .next()
                .unwrap_or_default()
                .to_string();
            if !child.is_empty() && !structure.children.contains(&child) {
                structure.children.push(child);
            }
            continue;
        }

        if selector.starts_with("&--") || selector.contains(&variation_marker) {
            let variation = if let Some(rest) = selector.strip_prefix("&--") {
                rest.split(' ').next().unwrap_or_default()
            } else {
                selector
                    .split(&variation_marker)
                    .nth(1)
                    .and_then(|rest| rest.split(' ').next())
                    .unwrap_or_default()
            };
            if !variation.is_empty() && !structure.variations.contains(&variation.to_string()) {
                structure.variations.push(variation.to_string());
            }
            continue;
        }

        // Nested plain selectors inside the component count as children.
        if depth > 1 && selector.starts_with('.') && !selector.contains('&') {
            let nested = selector
                .trim_start_matches('.')
                .split(' ')
                .next()
                .unwrap_or_default()
                .to_string();
            if nested != component_name && !nested.is_empty() && !structure.children.contains(&nested)
            {
                structure.children.push(nested);
            }
        }
    }
    structure
}

/// Parent→child nesting paths, in source order, for grouped emission.
fn parse_nesting(scss: &str, component_name: &str) -> Vec<Vec<String>> {
    let base_selector = format!(".{component_name}");
    let mut paths: Vec<Vec<String>> = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for raw in scss.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with("//") || line.starts_with("/*") {
            continue;
        }
        let closes = line.matches('}').count();

        if let Some(caps) = OPEN_SELECTOR_RE.captures(line) {
            let selector = caps[1].trim();
            if selector == base_selector {
                current = vec![component_name.to_string()];
            } else if !current.is_empty() {
                let class_name = if let Some(rest) = selector.strip_prefix("&__") {
                    rest.split(' ').next().unwrap_or_default()
                } else if let Some(rest) = selector.strip_prefix('.') {
                    rest.split(' ').next().unwrap_or_default()
                } else {
                    ""
                };
                if !class_name.is_empty() {
                    current.push(class_name.to_string());
                    paths.push(current.clone());
                }
            }
        }

        if closes > 0 && current.len() > 1 {
            current.pop();
        }
    }
    paths
}

fn tag_annotation(scss: &str) -> Option<String> {
    TAG_ANNOTATION_RE
        .captures(scss)
        .map(|caps| caps[1].to_string())
}

fn children_annotation(scss: &str) -> Option<String> {
    CHILDREN_ANNOTATION_RE
        .captures(scss)
        .map(|caps| caps[1].to_string())
}

/// Child generation is opt-in: absent annotation means no children,
/// `none` disables explicitly, any other value enables.
fn auto_children(scss: &str) -> bool {
    match children_annotation(scss).as_deref() {
        None | Some("none") => false,
        Some(_) => true,
    }
}

fn tag_from_naming(name: &str) -> Option<&'static str> {
    NAMING_TAGS
        .iter()
        .find(|(pattern, _)| name.contains(pattern))
        .map(|(_, tag)| *tag)
}

/// Guess a tag from CSS property co-occurrence, most specific first.
fn tag_from_css(scss: &str) -> Option<&'static str> {
    let code = scss.to_lowercase();
    if code.contains("cursor: pointer") && code.contains("background") {
        return Some("button");
    }
    if code.contains("cursor: pointer") && code.contains("text-decoration") {
        return Some("a");
    }
    if code.contains("display: grid") || code.contains("grid-template") {
        return Some("section");
    }
    if code.contains("display: flex") && code.contains("flex-direction: column") {
        return Some("section");
    }
    if code.contains("border") && code.contains("padding") && code.contains("background") {
        return Some("input");
    }
    if code.contains("font-size") && code.contains("line-height") && !code.contains("display: flex")
    {
        return Some("p");
    }
    if code.contains("position: fixed") || code.contains("position: absolute") {
        return Some("aside");
    }
    if code.contains("display: flex") && code.contains("justify-content") {
        return Some("nav");
    }
    None
}

/// Broad last-resort tag dictionary, checked in order. Also used for
/// child elements, whose only signal is their name.
fn fallback_tag(name: &str) -> &'static str {
    let name = name.to_lowercase();
    let part = |p: &str| {
        name == p
            || name.starts_with(&format!("{p}-"))
            || name.ends_with(&format!("-{p}"))
            || name.contains(&format!("-{p}-"))
    };

    if part("ul") {
        return "ul";
    }
    if part("li") {
        return "li";
    }
    if part("ol") {
        return "ol";
    }
    if part("dl") {
        return "dl";
    }
    if part("dt") {
        return "dt";
    }
    if part("dd") {
        return "dd";
    }
    if name.contains("nav") {
        return "nav";
    }
    if name.contains("header") {
        return "header";
    }
    if name.contains("footer") {
        return "footer";
    }
    if name.contains("aside") {
        return "aside";
    }
    if name.contains("main") {
        return "main";
    }
    if name.contains("section") {
        return "section";
    }
    if name.contains("article") {
        return "article";
    }
    if name.contains("button") || name.starts_with("btn-") {
        return "button";
    }
    if name.contains("input") {
        return "input";
    }
    if name.contains("form") {
        return "form";
    }
    if name.contains("select") {
        return "select";
    }
    if name.contains("textarea") {
        return "textarea";
    }
    if name.contains("link") || name.contains("anchor") {
        return "a";
    }
    if name.contains("image") || name.contains("img") {
        return "img";
    }
    if name.contains("video") {
        return "video";
    }
    if name.contains("audio") {
        return "audio";
    }
    if name.contains("list") && !name.contains("item") {
        return "ul";
    }
    if name.contains("item") {
        return "li";
    }
    if name.contains("heading") || name.contains("title") {
        return "h1";
    }
    if name.contains("paragraph") || name.contains("text") {
        return "p";
    }
    if name.contains("table") {
        return "table";
    }
    if name.contains("row") {
        return "tr";
    }
    if name.contains("cell") || part("td") {
        return "td";
    }
    if part("th") {
        return "th";
    }
    "div"
}

/// Resolve the element tag through the four-stage inference chain.
pub fn determine_tag(scss: &str, name: &str) -> String {
    if let Some(tag) = tag_annotation(scss) {
        return tag;
    }
    if let Some(tag) = tag_from_naming(name) {
        return tag.to_string();
    }
    if let Some(tag) = tag_from_css(scss) {
        return tag.to_string();
    }
    fallback_tag(name).to_string()
}

fn content_for_child(name: &str) -> String {
    CHILD_CONTENT
        .iter()
        .find(|(child, _)| *child == name)
        .map(|(_, content)| (*content).to_string())
        .unwrap_or_else(|| format!("{name} content"))
}

fn default_content(name: &str) -> String {
    let pretty = name
        .strip_prefix("trunk-")
        .unwrap_or(name)
        .replacen('-', " ", 1);
    format!("\n    {pretty} content\n")
}

fn group_children(paths: &[Vec<String>]) -> IndexMap<String, Vec<String>> {
    let mut grouped: IndexMap<String, Vec<String>> = IndexMap::new();
    for path in paths {
        if path.len() < 2 {
            continue;
        }
        let parent = path[path.len() - 2].clone();
        let child = path[path.len() - 1].clone();
        let entry = grouped.entry(parent).or_default();
        if !entry.contains(&child) {
            entry.push(child);
        }
    }
    grouped
}

fn nested_element(name: &str, grouped: &IndexMap<String, Vec<String>>, indent: usize) -> String {
    let pad = "  ".repeat(indent);
    let tag = fallback_tag(name);
    let mut html = format!("\n{pad}<{tag} class=\"{name}\">");
    match grouped.get(name) {
        Some(children) => {
            for child in children {
                html.push_str(&nested_element(child, grouped, indent + 1));
            }
            html.push('\n');
            html.push_str(&pad);
        }
        None => html.push_str(&content_for_child(name)),
    }
    html.push_str(&format!("</{tag}>"));
    html
}

/// Render the full HTML fragment for a grown trunk: wrapper comments,
/// the base element, then one flat element per variation.
pub fn generate_component_html(scss: &str, final_name: &str) -> String {
    let structure = analyze_structure(scss, final_name);
    let tag = determine_tag(scss, final_name);

    let mut html = format!("\n<!-- {final_name} -->\n");
    html.push_str(&format!("<{tag} class=\"{final_name}\">"));
    if auto_children(scss) && !structure.children.is_empty() {
        let grouped = group_children(&parse_nesting(scss, final_name));
        if let Some(top) = grouped.get(final_name) {
            for child in top {
                html.push_str(&nested_element(child, &grouped, 1));
            }
        }
        html.push('\n');
    } else {
        html.push_str(&default_content(final_name));
    }
    html.push_str(&format!("</{tag}>\n"));

    for variation in &structure.variations {
        html.push_str(&format!(
            "<{tag} class=\"{final_name} {final_name}--{variation}\">{}</{tag}>\n",
            default_content(final_name)
        ));
    }

    html.push_str(&format!("<!-- End {final_name} -->\n"));
    html
}

/// Splice a fragment into the host document's TRUNKS section.
///
/// Injection is idempotent on the `<!-- {name} -->` wrapper comment.
/// When no banner exists yet, the banner pair is created directly
/// before `</body>`.
pub fn inject_into_host(host: &str, snippet: &str, final_name: &str) -> (String, InsertStatus) {
    if host.contains(&format!("<!-- {final_name} -->")) {
        return (host.to_string(), InsertStatus::AlreadyExists);
    }

    if let Some(start) = host.find(TRUNKS_HOST_BANNER) {
        let insert_at = host[start..]
            .find(LEAFS_HOST_BANNER)
            .map(|offset| start + offset)
            .or_else(|| host.rfind("</body>"))
            .unwrap_or(host.len());
        let updated = format!("{}{}{}", &host[..insert_at], snippet, &host[insert_at..]);
        return (updated, InsertStatus::Inserted);
    }

    let block = format!(
        "\n\n{TRUNKS_HOST_BANNER}\n<!-- Trunks are the main structural components -->\n\n{snippet}\n<!-- End TRUNKS SECTION -->\n\n"
    );
    match host.rfind("</body>") {
        Some(at) => (
            format!("{}{}{}", &host[..at], block, &host[at..]),
            InsertStatus::Inserted,
        ),
        None => {
            warn!("</body> missing in host document, appending at end");
            (format!("{host}{block}"), InsertStatus::Inserted)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARD: &str = r#"
.trunk-card {
  display: flex;
  flex-direction: column;

  &__title {
    font-weight: 700;
  }

  &__body {
    padding: 1rem;
  }

  &--featured {
    border: 2px solid gold;
  }
}
"#;

    #[test]
    fn structure_analysis_finds_children_and_variations() {
        let structure = analyze_structure(CARD, "trunk-card");
        assert_eq!(structure.children, vec!["title", "body"]);
        assert_eq!(structure.variations, vec!["featured"]);
    }

    #[test]
    fn annotation_beats_every_other_stage() {
        let scss = "// @html-tag: dialog\n.trunk-card {\n  cursor: pointer;\n  background: red;\n}";
        assert_eq!(determine_tag(scss, "trunk-card"), "dialog");
    }

    #[test]
    fn naming_table_beats_css_heuristics() {
        // CSS says button (cursor+background) but the name says article.
        let scss = ".promo-card {\n  cursor: pointer;\n  background: red;\n}";
        assert_eq!(determine_tag(scss, "promo-card"), "article");
    }

    #[test]
    fn css_heuristics_fill_in_for_neutral_names() {
        let scss = ".thing {\n  display: grid;\n}";
        assert_eq!(determine_tag(scss, "thing"), "section");
        let fixed = ".thing {\n  position: fixed;\n}";
        assert_eq!(determine_tag(fixed, "thing"), "aside");
    }

    #[test]
    fn fallback_dictionary_then_div() {
        assert_eq!(determine_tag(".x {\n}", "sidebar-ul"), "ul");
        assert_eq!(determine_tag(".x {\n}", "mystery"), "div");
    }

    #[test]
    fn children_are_opt_in() {
        let html = generate_component_html(CARD, "trunk-card");
        assert!(!html.contains("class=\"title\""));

        let annotated = format!("// @html-children: auto\n{CARD}");
        let html = generate_component_html(&annotated, "trunk-card");
        assert!(html.contains("<h1 class=\"title\">Title</h1>"));
        assert!(html.contains("class=\"body\""));
    }

    #[test]
    fn children_annotation_none_disables() {
        let annotated = format!("// @html-children: none\n{CARD}");
        let html = generate_component_html(&annotated, "trunk-card");
        assert!(!html.contains("class=\"title\""));
    }

    #[test]
    fn variations_render_flat_without_children() {
        let annotated = format!("// @html-children: auto\n{CARD}");
        let html = generate_component_html(&annotated, "trunk-card");
        assert!(html.contains("class=\"trunk-card trunk-card--featured\""));
        // The variation element carries only placeholder content.
        let variation_line = html
            .lines()
            .find(|line| line.contains("trunk-card--featured"))
            .unwrap();
        assert!(!variation_line.contains("title"));
    }

    #[test]
    fn fragment_is_wrapped_in_marker_comments() {
        let html = generate_component_html(CARD, "trunk-card");
        assert!(html.contains("<!-- trunk-card -->"));
        assert!(html.trim_end().ends_with("<!-- End trunk-card -->"));
    }

    #[test]
    fn injection_into_existing_banner_pair() {
        let host = format!(
            "<html>\n<body>\n{TRUNKS_HOST_BANNER}\n\n{LEAFS_HOST_BANNER}\n</body>\n</html>"
        );
        let (updated, status) = inject_into_host(&host, "<!-- navbar -->\n<nav></nav>\n", "navbar");
        assert_eq!(status, InsertStatus::Inserted);
        let nav = updated.find("<nav>").unwrap();
        assert!(nav > updated.find(TRUNKS_HOST_BANNER).unwrap());
        assert!(nav < updated.find(LEAFS_HOST_BANNER).unwrap());
    }

    #[test]
    fn injection_creates_banner_before_body_close() {
        let host = "<html>\n<body>\n<p>hi</p>\n</body>\n</html>";
        let (updated, _) = inject_into_host(host, "<!-- navbar -->\n", "navbar");
        let banner = updated.find(TRUNKS_HOST_BANNER).unwrap();
        assert!(banner < updated.find("</body>").unwrap());
        assert!(banner > updated.find("<p>hi</p>").unwrap());
    }

    #[test]
    fn injection_is_idempotent_per_component() {
        let host = format!("<body>\n{TRUNKS_HOST_BANNER}\n<!-- navbar -->\n</body>");
        let (updated, status) = inject_into_host(&host, "<!-- navbar -->\n", "navbar");
        assert_eq!(status, InsertStatus::AlreadyExists);
        assert_eq!(updated, host);
    }
}
