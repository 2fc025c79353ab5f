//! Markup to plain text
//!
//! Rendered templates use lightweight markdown. The compositor draws plain
//! lines, so markup is reduced to what reads well on paper: headings in
//! capitals, bullets as `•`, quotes indented, everything else unwrapped.
//!
//! Every rewrite removes at least one markup character, so [`normalize`]
//! applies the rewrite pass until nothing changes. The result is a fixpoint,
//! which makes the function idempotent.

use once_cell::sync::Lazy;
use regex::Regex;

macro_rules! pattern {
    ($name:ident, $re:literal) => {
        static $name: Lazy<Regex> = Lazy::new(|| {
            Regex::new($re).unwrap_or_else(|e| unreachable!("pattern {} is valid: {e}", $re))
        });
    };
}

pattern!(HEADING, r"^\s{0,3}#{1,6}\s+(.*?)\s*#*\s*$");
pattern!(QUOTE, r"^\s*(?:>\s?)+(.*)$");
pattern!(BULLET, r"^(\s*)[-*+]\s+(.*)$");
pattern!(RULE, r"^\s*(?:(?:-\s*){3,}|(?:\*\s*){3,}|(?:_\s*){3,})$");
pattern!(TABLE_SEPARATOR, r"^\s*\|?\s*:?-+:?\s*(?:\|\s*:?-+:?\s*)+\|?\s*$");
pattern!(LINK, r"!?\[([^\]]*)\]\([^)]*\)");
pattern!(BOLD_STAR, r"\*\*(.+?)\*\*");
pattern!(BOLD_UNDERSCORE, r"__(.+?)__");
pattern!(ITALIC_STAR, r"\*([^*\s](?:[^*]*[^*\s])?)\*");
pattern!(ITALIC_UNDERSCORE, r"\b_([^_\s](?:[^_]*[^_\s])?)_\b");
pattern!(STRIKE, r"~~(.+?)~~");

const QUOTE_INDENT: &str = "    ";

/// Reduce markup to plain text
///
/// Blank-line runs collapse to one and leading/trailing blank lines are
/// dropped. `normalize(normalize(x)) == normalize(x)` for every input.
#[must_use]
pub fn normalize(markup: &str) -> String {
    let mut current = rewrite(markup);
    loop {
        let next = rewrite(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn rewrite(text: &str) -> String {
    let lines = text
        .lines()
        .filter(|line| !is_fence(line) && !is_rule(line))
        .map(rewrite_line);
    collapse_blank_lines(lines)
}

fn is_fence(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

fn is_rule(line: &str) -> bool {
    TABLE_SEPARATOR.is_match(line) || RULE.is_match(line)
}

fn rewrite_line(line: &str) -> String {
    let mut line = flatten_table_row(line).unwrap_or_else(|| line.to_string());

    if let Some(caps) = HEADING.captures(&line) {
        line = caps[1].to_uppercase();
    }
    if let Some(caps) = QUOTE.captures(&line) {
        line = format!("{QUOTE_INDENT}{}", &caps[1]);
    }
    line = BULLET.replace(&line, "${1}• ${2}").into_owned();

    line = strip_inline(&line);
    line.trim_end().to_string()
}

fn flatten_table_row(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if !trimmed.starts_with('|') {
        return None;
    }
    let cells: Vec<&str> = trimmed
        .split('|')
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .collect();
    Some(cells.join(" "))
}

fn strip_inline(line: &str) -> String {
    let line = LINK.replace_all(line, "${1}");
    let line = BOLD_STAR.replace_all(&line, "${1}");
    let line = BOLD_UNDERSCORE.replace_all(&line, "${1}");
    let line = ITALIC_STAR.replace_all(&line, "${1}");
    let line = ITALIC_UNDERSCORE.replace_all(&line, "${1}");
    let line = STRIKE.replace_all(&line, "${1}");
    line.replace('`', "")
}

fn collapse_blank_lines(lines: impl Iterator<Item = String>) -> String {
    let mut out: Vec<String> = Vec::new();
    for line in lines {
        let blank = line.trim().is_empty();
        if blank && out.last().map_or(true, String::is_empty) {
            continue;
        }
        out.push(if blank { String::new() } else { line });
    }
    while out.last().is_some_and(String::is_empty) {
        out.pop();
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn letter_markup() {
        let markup = "\n\n# Settlement Demand\n\n**RE:** Jane Roe\n\n\n\nDear *Adjuster*:\n\n- First item\n* Second item\n1. Numbered stays\n\n> Quoted **line**\n\n";
        let expected = "SETTLEMENT DEMAND\n\nRE: Jane Roe\n\nDear Adjuster:\n\n• First item\n• Second item\n1. Numbered stays\n\n    Quoted line";
        assert_eq!(normalize(markup), expected);
    }

    #[test]
    fn links_code_and_tables() {
        let markup = "See [the report](https://example.com/r.pdf) and `case_id`.\n\n```text\nraw\n```\n| Item | Cost |\n|------|-----:|\n| MRI | $900 |";
        let expected = "See the report and case_id.\n\nraw\nItem Cost\nMRI $900";
        assert_eq!(normalize(markup), expected);
    }

    #[test]
    fn snake_case_survives() {
        assert_eq!(normalize("witness_interview_prep"), "witness_interview_prep");
    }

    #[test]
    fn horizontal_rules_removed() {
        assert_eq!(normalize("above\n\n---\n\nbelow"), "above\n\nbelow");
    }

    #[test]
    fn nested_markup_converges() {
        assert_eq!(normalize("## ***Bold italic*** title ##"), "BOLD ITALIC TITLE");
    }

    #[test]
    fn empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("\n\n  \n"), "");
    }

    fn markupish() -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop_oneof![
                Just("# ".to_string()),
                Just("## ".to_string()),
                Just("> ".to_string()),
                Just("- ".to_string()),
                Just("* ".to_string()),
                Just("**".to_string()),
                Just("_".to_string()),
                Just("`".to_string()),
                Just("```".to_string()),
                Just("| ".to_string()),
                Just("---".to_string()),
                Just("[a](b)".to_string()),
                Just("\n".to_string()),
                Just("\n\n".to_string()),
                Just("  ".to_string()),
                "[a-zA-Z0-9 ]{0,8}",
            ],
            0..40,
        )
        .prop_map(|parts| parts.concat())
    }

    proptest! {
        #[test]
        fn idempotent_on_markup(text in markupish()) {
            let once = normalize(&text);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn idempotent_on_arbitrary_text(text in "\\PC{0,200}") {
            let once = normalize(&text);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn no_blank_runs(text in markupish()) {
            let out = normalize(&text);
            prop_assert!(!out.contains("\n\n\n"));
            prop_assert!(!out.starts_with('\n'));
            prop_assert!(!out.ends_with('\n'));
        }
    }
}
