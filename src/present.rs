use crate::scanner::Candidate;
use crate::text::strip_escapes;
use crate::theme::Palette;
use regex::Regex;
use std::sync::LazyLock;
use unicode_width::UnicodeWidthStr;

static CHOICE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<idx>\d+)\s*-\s*\[(?P<tag>.+?)\]\s*-\s*(?P<link>.+)")
        .unwrap_or_else(|e| panic!("choice line pattern: {e}"))
});

#[derive(Debug)]
pub struct Presentation {
    pub candidates: Vec<Candidate>,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub index: usize,
    pub tag: String,
}

/// Orders candidates bottom-of-text first and renders the numbered lines
/// handed to the selector. Line `n` describes `candidates[n - 1]`.
pub fn present(mut candidates: Vec<Candidate>, palette: &Palette) -> Presentation {
    candidates.sort_by(|a, b| b.start.cmp(&a.start));
    let tag_width = candidates.iter().map(|c| c.tag.width()).max().unwrap_or(0);
    let lines = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| encode_line(i + 1, &c.tag, &c.display_text, tag_width, palette))
        .collect();
    Presentation { candidates, lines }
}

pub fn encode_line(index: usize, tag: &str, display_text: &str, tag_width: usize, palette: &Palette) -> String {
    let bracketed = format!("[{tag}]");
    let pad = " ".repeat((tag_width + 2).saturating_sub(bracketed.width()));
    let dash = palette.paint("-", palette.dash);
    format!(
        "{} {dash} {}{pad} {dash} {display_text}",
        palette.paint(&format!("{index:4}"), palette.index),
        palette.paint(&bracketed, palette.tag),
    )
}

pub fn parse_line(line: &str) -> Option<Choice> {
    let plain = strip_escapes(line);
    let caps = CHOICE_LINE.captures(&plain)?;
    let index = caps.name("idx")?.as_str().parse().ok()?;
    let tag = caps.name("tag")?.as_str().to_string();
    Some(Choice { index, tag })
}

#[cfg(test)]
mod tests {
    use super::{encode_line, parse_line, present, Choice};
    use crate::scanner::Candidate;
    use crate::theme::Palette;

    fn candidate(tag: &str, raw: &str, start: usize) -> Candidate {
        Candidate {
            display_text: raw.to_string(),
            tag: tag.to_string(),
            raw: raw.to_string(),
            start,
        }
    }

    #[test]
    fn latest_text_comes_first() {
        let items = vec![
            candidate("url", "a", 5),
            candidate("url", "b", 50),
            candidate("url", "c", 20),
        ];
        let shown = present(items, &Palette::plain());
        let starts: Vec<usize> = shown.candidates.iter().map(|c| c.start).collect();
        assert_eq!(starts, [50, 20, 5]);
        assert_eq!(shown.lines[0], "   1 - [url] - b");
        assert_eq!(shown.lines[2], "   3 - [url] - a");
    }

    #[test]
    fn equal_offsets_keep_discovery_order() {
        let items = vec![candidate("file", "x", 7), candidate("dir", "y", 7)];
        let shown = present(items, &Palette::plain());
        assert_eq!(shown.candidates[0].raw, "x");
        assert_eq!(shown.candidates[1].raw, "y");
    }

    #[test]
    fn tags_are_padded_to_the_widest() {
        let items = vec![candidate("code err.", "e", 1), candidate("url", "u", 0)];
        let shown = present(items, &Palette::plain());
        assert_eq!(shown.lines[0], "   1 - [code err.] - e");
        assert_eq!(shown.lines[1], "   2 - [url]       - u");
    }

    #[test]
    fn encoded_line_parses_back() {
        let line = encode_line(3, "file", "a.txt", 4, &Palette::plain());
        assert_eq!(
            parse_line(&line),
            Some(Choice {
                index: 3,
                tag: "file".to_string()
            })
        );
    }

    #[test]
    fn colored_line_parses_back() {
        let line = encode_line(12, "code err.", "\x1b[38;2;255;0;0mrun.py, line 1\x1b[39m", 9, &Palette::default());
        assert_eq!(
            parse_line(&line),
            Some(Choice {
                index: 12,
                tag: "code err.".to_string()
            })
        );
    }

    #[test]
    fn garbage_does_not_parse() {
        assert_eq!(parse_line("garbage"), None);
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("   1 - [] - x"), None);
    }
}
