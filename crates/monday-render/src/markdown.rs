//! LLM-output markdown to platform mrkdwn conversion (§4.11).
//!
//! Rule: heading lines (`#`, `##`, ... followed by a space) become bold;
//! `**bold**` spans become single-star bold; everything else passes
//! through untouched.

/// Convert one line's leading `#+` heading marker to a bolded line.
fn convert_heading(line: &str) -> String {
    let trimmed = line.trim_start();
    let hashes = trimmed.chars().take_while(|c| *c == '#').count();
    if hashes == 0 {
        return line.to_string();
    }
    let rest = trimmed[hashes..].trim_start();
    if rest.is_empty() {
        return line.to_string();
    }
    format!("*{}*", rest)
}

/// Convert `**bold**` spans to `*bold*` on a single line, left to right.
fn convert_bold_spans(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(start) = rest.find("**") {
        let before = &rest[..start];
        out.push_str(before);
        let after_open = &rest[start + 2..];
        match after_open.find("**") {
            Some(end) => {
                out.push('*');
                out.push_str(&after_open[..end]);
                out.push('*');
                rest = &after_open[end + 2..];
            }
            None => {
                out.push_str("**");
                rest = after_open;
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Convert a full block of LLM markdown output to platform mrkdwn.
pub fn to_mrkdwn(input: &str) -> String {
    input
        .lines()
        .map(|line| convert_bold_spans(&convert_heading(line)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_becomes_bold() {
        assert_eq!(to_mrkdwn("# Title"), "*Title*");
        assert_eq!(to_mrkdwn("### Subsection"), "*Subsection*");
    }

    #[test]
    fn bold_span_becomes_single_star() {
        assert_eq!(to_mrkdwn("this is **important**"), "this is *important*");
    }

    #[test]
    fn unmatched_constructs_pass_through() {
        assert_eq!(to_mrkdwn("plain text, no markup"), "plain text, no markup");
        assert_eq!(to_mrkdwn("a ** dangling marker"), "a ** dangling marker");
    }

    #[test]
    fn mixed_heading_and_bold_in_multiline_input() {
        let input = "## Summary\nThe team finished **three** tasks.";
        let expected = "*Summary*\nThe team finished *three* tasks.";
        assert_eq!(to_mrkdwn(input), expected);
    }
}
