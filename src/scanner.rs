use crate::scheme::{HandlerContext, Scheme};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub display_text: String,
    pub tag: String,
    pub raw: String,
    pub start: usize,
}

/// Lazily walks one scheme over a text. A match the scheme's validator
/// rejects moves the cursor a single character past the match start instead
/// of past the whole match, so an overlapping valid match is still found.
pub struct Scanner<'s, 't> {
    scheme: &'s Scheme,
    text: &'t str,
    ctx: HandlerContext<'s>,
    pos: usize,
}

impl<'s, 't> Scanner<'s, 't> {
    pub fn new(scheme: &'s Scheme, text: &'t str, ctx: HandlerContext<'s>) -> Self {
        Self {
            scheme,
            text,
            ctx,
            pos: 0,
        }
    }

    fn step_from(&self, offset: usize) -> usize {
        offset
            + self.text[offset..]
                .chars()
                .next()
                .map_or(1, char::len_utf8)
    }
}

impl Iterator for Scanner<'_, '_> {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        while self.pos < self.text.len() {
            let m = self.scheme.find_at(self.text, self.pos)?;
            let Some(label) = self.scheme.label(&m, &self.ctx) else {
                self.pos = self.step_from(m.start());
                continue;
            };
            self.pos = if m.end() > m.start() {
                m.end()
            } else {
                self.step_from(m.start())
            };
            return Some(Candidate {
                display_text: label.display_text,
                tag: label.tag,
                raw: m.as_str().to_string(),
                start: m.start(),
            });
        }
        None
    }
}
