use crate::error::SelectionError;
use crate::open::{OpenAction, Opener};
use crate::present::parse_line;
use crate::registry::Registry;
use crate::scanner::Candidate;
use crate::scheme::{HandlerContext, OpenKind};
use crate::theme::Palette;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Modifier {
    #[default]
    None,
    Copy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Open { kind: OpenKind, action: OpenAction },
    Copy(Option<String>),
}

/// Maps selector output back onto the candidates it was built from.
pub struct SelectionResolver<'a> {
    registry: &'a Registry,
    candidates: &'a [Candidate],
    ctx: HandlerContext<'a>,
}

impl<'a> SelectionResolver<'a> {
    pub fn new(registry: &'a Registry, candidates: &'a [Candidate], ctx: HandlerContext<'a>) -> Self {
        Self {
            registry,
            candidates,
            ctx,
        }
    }

    pub fn resolve(&self, line: &str, modifier: Modifier) -> Result<Resolution, SelectionError> {
        let malformed = || SelectionError::Malformed(line.to_string());
        let choice = parse_line(line).ok_or_else(malformed)?;
        let candidate = choice
            .index
            .checked_sub(1)
            .and_then(|i| self.candidates.get(i))
            .ok_or_else(malformed)?;
        let scheme = self.registry.by_tag(&choice.tag).ok_or_else(malformed)?;

        // Copied text must not carry color sequences.
        let plain = Palette::plain();
        let ctx = match modifier {
            Modifier::Copy => self.ctx.with_palette(&plain),
            Modifier::None => self.ctx,
        };

        let rematch = scheme
            .rematch(&candidate.raw, &ctx)
            .ok_or_else(|| SelectionError::Rematch {
                tag: choice.tag.clone(),
                text: candidate.raw.clone(),
            })?;
        debug!(tag = %choice.tag, pattern = rematch.pattern(), "re-derived selection");

        match modifier {
            Modifier::Copy => Ok(Resolution::Copy(
                scheme.label(&rematch, &ctx).map(|label| label.display_text),
            )),
            Modifier::None => Ok(Resolution::Open {
                kind: scheme.open_kind(),
                action: scheme.action(&rematch, &ctx)?,
            }),
        }
    }

    /// Handles each selection on its own: failures are logged and skipped.
    /// Returns the text gathered for the clipboard, if any.
    pub fn process(&self, selection: &[String], modifier: Modifier, opener: &mut dyn Opener) -> Vec<String> {
        let mut clipboard = Vec::new();
        for line in selection {
            match self.resolve(line, modifier) {
                Ok(Resolution::Copy(text)) => clipboard.extend(text),
                Ok(Resolution::Open { kind, action }) => {
                    info!(%kind, %action, "opening");
                    if let Err(e) = opener.open(kind, &action) {
                        error!("error: {e}");
                    }
                }
                Err(e) => error!("error: {e}"),
            }
        }
        clipboard
    }
}
