//! Pattern schemes: tags, ordered patterns, and the optional validator and
//! resolver capabilities that label a match and turn a selection into an action.

use crate::error::{ConfigError, OpenError};
use crate::open::OpenAction;
use crate::paths::PathFinder;
use crate::theme::Palette;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenKind {
    Editor,
    Browser,
    Custom,
}

impl fmt::Display for OpenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Editor => write!(f, "editor"),
            Self::Browser => write!(f, "browser"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// Collaborators handed to validators and resolvers on every call.
#[derive(Clone, Copy)]
pub struct HandlerContext<'a> {
    pub paths: &'a dyn PathFinder,
    pub palette: &'a Palette,
    pub editor_cmd: &'a str,
}

impl<'a> HandlerContext<'a> {
    pub fn with_palette(self, palette: &'a Palette) -> Self {
        Self { palette, ..self }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labeled {
    pub display_text: String,
    pub tag: String,
}

impl Labeled {
    pub fn new(display_text: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            display_text: display_text.into(),
            tag: tag.into(),
        }
    }
}

/// A live match of one of a scheme's patterns.
pub struct SchemeMatch<'t> {
    caps: Captures<'t>,
    start: usize,
    end: usize,
    pattern: usize,
}

impl<'t> SchemeMatch<'t> {
    fn new(caps: Captures<'t>, pattern: usize) -> Option<Self> {
        let whole = caps.get(0)?;
        Some(Self {
            start: whole.start(),
            end: whole.end(),
            caps,
            pattern,
        })
    }

    pub fn as_str(&self) -> &'t str {
        self.caps.get(0).map_or("", |m| m.as_str())
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn pattern(&self) -> usize {
        self.pattern
    }

    pub fn name(&self, group: &str) -> Option<&'t str> {
        self.caps.name(group).map(|m| m.as_str())
    }

    /// Expands `$name` / `${name}` references against the capture groups.
    pub fn expand(&self, template: &str) -> String {
        let mut out = String::new();
        self.caps.expand(template, &mut out);
        out
    }
}

pub trait Validator {
    /// Returns `None` to reject the match.
    fn validate(&self, m: &SchemeMatch<'_>, ctx: &HandlerContext<'_>) -> Option<Labeled>;
}

pub trait Resolver {
    fn resolve(&self, m: &SchemeMatch<'_>, ctx: &HandlerContext<'_>) -> Result<OpenAction, OpenError>;
}

#[cfg(test)]
pub struct FnValidator<F>(F);

#[cfg(test)]
pub fn validate_with<F>(f: F) -> FnValidator<F>
where
    F: Fn(&SchemeMatch<'_>, &HandlerContext<'_>) -> Option<Labeled>,
{
    FnValidator(f)
}

#[cfg(test)]
impl<F> Validator for FnValidator<F>
where
    F: Fn(&SchemeMatch<'_>, &HandlerContext<'_>) -> Option<Labeled>,
{
    fn validate(&self, m: &SchemeMatch<'_>, ctx: &HandlerContext<'_>) -> Option<Labeled> {
        (self.0)(m, ctx)
    }
}

pub struct Scheme {
    tags: Vec<String>,
    patterns: Vec<Regex>,
    open_kind: OpenKind,
    validator: Option<Box<dyn Validator>>,
    resolver: Option<Box<dyn Resolver>>,
}

impl fmt::Debug for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheme")
            .field("tags", &self.tags)
            .field("patterns", &self.patterns)
            .field("open_kind", &self.open_kind)
            .field("validator", &self.validator.is_some())
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}

impl Scheme {
    pub fn new<T, S>(tags: T, patterns: Vec<Regex>, open_kind: OpenKind) -> Result<Self, ConfigError>
    where
        T: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: Vec<String> = tags.into_iter().map(Into::into).collect();
        let malformed = |reason: String| ConfigError::MalformedScheme {
            tags: tags.clone(),
            reason,
        };
        if tags.is_empty() {
            return Err(malformed("at least one tag is required".to_string()));
        }
        if let Some(tag) = tags.iter().find(|t| t.trim().is_empty()) {
            return Err(malformed(format!("tag {tag:?} is blank")));
        }
        for (i, tag) in tags.iter().enumerate() {
            if tags[..i].contains(tag) {
                return Err(malformed(format!("tag {tag:?} is listed twice")));
            }
        }
        if patterns.is_empty() {
            return Err(malformed("at least one pattern is required".to_string()));
        }
        Ok(Self {
            tags,
            patterns,
            open_kind,
            validator: None,
            resolver: None,
        })
    }

    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    pub fn with_resolver(mut self, resolver: impl Resolver + 'static) -> Self {
        self.resolver = Some(Box::new(resolver));
        self
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn primary_tag(&self) -> &str {
        &self.tags[0]
    }

    pub fn owns_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn open_kind(&self) -> OpenKind {
        self.open_kind
    }

    pub fn has_resolver(&self) -> bool {
        self.resolver.is_some()
    }

    /// Leftmost match at or after `pos` across all patterns; on a tie the
    /// earlier pattern wins.
    pub fn find_at<'t>(&self, text: &'t str, pos: usize) -> Option<SchemeMatch<'t>> {
        let mut best: Option<SchemeMatch<'t>> = None;
        for (i, pattern) in self.patterns.iter().enumerate() {
            let Some(found) = pattern.captures_at(text, pos).and_then(|c| SchemeMatch::new(c, i))
            else {
                continue;
            };
            match &best {
                Some(current) if current.start <= found.start => {}
                _ => best = Some(found),
            }
        }
        best
    }

    /// Re-derives a match from a previously accepted raw text. Patterns that
    /// cover the whole text and pass validation are preferred, so a span that
    /// was found by a later pattern is not re-labelled by an earlier one.
    pub fn rematch<'t>(&self, raw: &'t str, ctx: &HandlerContext<'_>) -> Option<SchemeMatch<'t>> {
        let mut full_span: Option<SchemeMatch<'t>> = None;
        for (i, pattern) in self.patterns.iter().enumerate() {
            let Some(found) = pattern.captures(raw).and_then(|c| SchemeMatch::new(c, i)) else {
                continue;
            };
            if found.start != 0 || found.end != raw.len() {
                continue;
            }
            if self.label(&found, ctx).is_some() {
                return Some(found);
            }
            if full_span.is_none() {
                full_span = Some(found);
            }
        }
        full_span.or_else(|| self.find_at(raw, 0))
    }

    pub fn label(&self, m: &SchemeMatch<'_>, ctx: &HandlerContext<'_>) -> Option<Labeled> {
        match &self.validator {
            Some(validator) => validator.validate(m, ctx),
            None => Some(Labeled::new(m.as_str(), self.primary_tag())),
        }
    }

    pub fn action(&self, m: &SchemeMatch<'_>, ctx: &HandlerContext<'_>) -> Result<OpenAction, OpenError> {
        if let Some(resolver) = &self.resolver {
            return resolver.resolve(m, ctx);
        }
        match self.open_kind {
            OpenKind::Editor => Ok(OpenAction::OpenFile {
                path: m.as_str().into(),
                line: None,
            }),
            OpenKind::Browser => Ok(OpenAction::OpenUrl {
                url: m.as_str().to_string(),
            }),
            OpenKind::Custom => Err(OpenError::MissingPostHandler(self.tags.clone())),
        }
    }
}

pub fn compile(tags: &[String], pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
        tags: tags.to_vec(),
        source,
    })
}
