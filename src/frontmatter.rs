//! Frontmatter blocks: every generated file opens with a `---`-delimited
//! block carrying at least the generation timestamp and the version string.
//! One stripping rule applies everywhere: the block exists only when the very
//! first line is `---`, and it ends at the nearest following `---` line.

use chrono::{DateTime, SecondsFormat, Utc};

/// Frontmatter delimiter line.
pub const DELIMITER: &str = "---";

/// The version and timestamp stamped into generated files for one run.
#[derive(Debug, Clone)]
pub struct Stamp {
    pub version: String,
    pub generated: DateTime<Utc>,
}

impl Stamp {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            generated: Utc::now(),
        }
    }

    pub fn generated_rfc3339(&self) -> String {
        self.generated.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Render a frontmatter block with the stamp fields plus any extra key/value
/// pairs, in the order given. The returned string ends with a newline after
/// the closing delimiter.
pub fn render(stamp: &Stamp, extra: &[(&str, &str)]) -> String {
    let mut block = String::new();
    block.push_str(DELIMITER);
    block.push('\n');
    block.push_str(&format!("generated: {}\n", stamp.generated_rfc3339()));
    block.push_str(&format!("version: {}\n", stamp.version));
    for (key, value) in extra {
        block.push_str(&format!("{key}: {value}\n"));
    }
    block.push_str(DELIMITER);
    block.push('\n');
    block
}

/// Strip a leading frontmatter block from `content`.
///
/// The first line must be exactly `---`; the block closes at the nearest
/// subsequent `---` line, which is removed along with everything before it,
/// and any blank lines that follow. Content whose first line is not `---`, or
/// with no closing delimiter, is returned unchanged, so malformed input
/// passes through rather than being corrupted.
pub fn strip(content: &str) -> String {
    let mut lines = content.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return content.to_string();
    };
    if first.trim_end() != DELIMITER {
        return content.to_string();
    }
    let mut offset = first.len();
    for line in lines {
        let closes = line.trim_end() == DELIMITER;
        offset += line.len();
        if closes {
            return skip_blank_lines(&content[offset..]).to_string();
        }
    }
    content.to_string()
}

/// Drop leading lines that are empty or whitespace-only.
fn skip_blank_lines(mut content: &str) -> &str {
    loop {
        match content.find('\n') {
            Some(newline) if content[..newline].trim().is_empty() => {
                content = &content[newline + 1..];
            }
            Some(_) => return content,
            None => {
                return if content.trim().is_empty() {
                    ""
                } else {
                    content
                };
            }
        }
    }
}
