//! Line and section extraction for markdown instruction files

use crate::models::Section;

/// Maximum ATX heading depth
const MAX_HEADING_LEVEL: usize = 6;

/// Split content into lines, dropping the `\r` of CRLF endings
pub fn split_lines(content: &str) -> Vec<String> {
    if content.is_empty() {
        return Vec::new();
    }
    content
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
        .collect()
}

/// Parse a heading line, returning `(level, text)`.
///
/// A heading is a trimmed line starting with 1-6 `#` followed by whitespace
/// and non-empty text.
pub fn parse_heading(line: &str) -> Option<(u8, &str)> {
    let trimmed = line.trim();
    let level = trimmed.chars().take_while(|c| *c == '#').count();
    if level == 0 || level > MAX_HEADING_LEVEL {
        return None;
    }
    let rest = &trimmed[level..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let text = rest.trim().trim_end_matches('#').trim_end();
    if text.is_empty() {
        return None;
    }
    Some((level as u8, text))
}

/// Build the flat section list for a file.
///
/// A section runs from its heading to the line before the next heading of the
/// same or shallower level, or to the end of the file.
pub fn parse_sections(lines: &[String]) -> Vec<Section> {
    let headings: Vec<(usize, u8, &str)> = lines
        .iter()
        .enumerate()
        .filter_map(|(idx, line)| parse_heading(line).map(|(level, text)| (idx, level, text)))
        .collect();

    headings
        .iter()
        .enumerate()
        .map(|(i, &(idx, level, text))| {
            let end_idx = headings[i + 1..]
                .iter()
                .find(|(_, next_level, _)| *next_level <= level)
                .map(|(next_idx, _, _)| *next_idx)
                .unwrap_or(lines.len());

            Section {
                heading: text.to_string(),
                level,
                start_line: idx + 1,
                end_line: end_idx,
                content: lines[idx + 1..end_idx].join("\n"),
            }
        })
        .collect()
}

/// Whether a line opens or closes a fenced code block
pub fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

/// Per-line flag marking lines inside fenced code blocks (fence lines included)
pub fn code_fence_mask(lines: &[String]) -> Vec<bool> {
    let mut in_fence = false;
    lines
        .iter()
        .map(|line| {
            if is_fence(line) {
                in_fence = !in_fence;
                return true;
            }
            in_fence
        })
        .collect()
}
