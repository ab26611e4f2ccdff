//! SKILL.md descriptor: extract the declared `name` from the leading frontmatter block.
//!
//! Only the `name:` line is read; the rest of the frontmatter is not validated, so a block that
//! is not well-formed YAML still yields a name as long as the line is there.

use std::path::Path;

/// File name of the descriptor every skill directory carries.
pub const DESCRIPTOR_FILE: &str = "SKILL.md";

const FRONTMATTER_MARKER: &str = "---";

/// Read `path` and return its declared skill name. Unreadable files yield `None`.
pub fn extract_skill_name(path: &Path) -> Option<String> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            log::debug!("cannot read {}: {}", path.display(), e);
            return None;
        }
    };
    parse_skill_name(&content)
}

/// Return the first non-empty `name:` value in the frontmatter, trimmed and unquoted.
pub fn parse_skill_name(content: &str) -> Option<String> {
    frontmatter(content)?
        .lines()
        .filter_map(|line| line.strip_prefix("name:"))
        .map(|value| value.trim().trim_matches(|c: char| c == '"' || c == '\''))
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Text between the opening `---` line (first line of the file) and the next line starting with `---`.
fn frontmatter(content: &str) -> Option<&str> {
    let rest = content.strip_prefix(FRONTMATTER_MARKER)?;
    let newline = rest.find('\n')?;
    if !rest[..newline].trim().is_empty() {
        return None;
    }
    let body = &rest[newline + 1..];
    let end = body.find(&format!("\n{FRONTMATTER_MARKER}"))?;
    Some(&body[..end])
}
