//! Schemes declared in the config file.
//!
//! ```toml
//! [[schemes]]
//! tags = ["jira"]
//! patterns = ['\b(?P<key>[A-Z]{2,}-\d+)\b']
//! opener = "browser"
//! target = "https://jira.example.com/browse/${key}"
//! ```

use crate::error::{ConfigError, OpenError};
use crate::open::OpenAction;
use crate::scheme::{compile, HandlerContext, Labeled, OpenKind, Resolver, Scheme, SchemeMatch, Validator};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeDef {
    pub tags: Vec<String>,
    pub patterns: Vec<String>,
    #[serde(default = "default_opener")]
    pub opener: OpenKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
}

fn default_opener() -> OpenKind {
    OpenKind::Browser
}

impl SchemeDef {
    pub fn to_scheme(&self, index: usize) -> Result<Scheme, ConfigError> {
        let patterns = self
            .patterns
            .iter()
            .map(|p| compile(&self.tags, p))
            .collect::<Result<Vec<_>, _>>()?;
        let mut scheme = Scheme::new(self.tags.iter().cloned(), patterns, self.opener)
            .map_err(|e| ConfigError::InvalidScheme {
                index,
                source: Box::new(e),
            })?;

        if let Some(template) = &self.display {
            scheme = scheme.with_validator(DisplayTemplate {
                template: template.clone(),
                tag: self.tags[0].clone(),
            });
        }

        let resolver = match self.opener {
            OpenKind::Custom => match &self.command {
                Some(argv) if !argv.is_empty() => Some(ActionTemplate::Command(argv.clone())),
                _ => return Err(ConfigError::MissingPostHandler(self.tags.clone())),
            },
            OpenKind::Browser => self.target.clone().map(ActionTemplate::Url),
            OpenKind::Editor => self.target.clone().map(|file| ActionTemplate::File {
                file,
                line: self.line.clone(),
            }),
        };
        if let Some(resolver) = resolver {
            scheme = scheme.with_resolver(resolver);
        }
        Ok(scheme)
    }
}

pub fn load(defs: &[SchemeDef]) -> Result<Vec<Scheme>, ConfigError> {
    defs.iter().enumerate().map(|(i, def)| def.to_scheme(i)).collect()
}

struct DisplayTemplate {
    template: String,
    tag: String,
}

impl Validator for DisplayTemplate {
    fn validate(&self, m: &SchemeMatch<'_>, _ctx: &HandlerContext<'_>) -> Option<Labeled> {
        let display = m.expand(&self.template);
        if display.trim().is_empty() {
            return None;
        }
        Some(Labeled::new(display, self.tag.clone()))
    }
}

enum ActionTemplate {
    Url(String),
    File { file: String, line: Option<String> },
    Command(Vec<String>),
}

impl Resolver for ActionTemplate {
    fn resolve(&self, m: &SchemeMatch<'_>, ctx: &HandlerContext<'_>) -> Result<OpenAction, OpenError> {
        match self {
            Self::Url(template) => Ok(OpenAction::OpenUrl {
                url: m.expand(template),
            }),
            Self::File { file, line } => {
                let raw = m.expand(file);
                let path = ctx
                    .paths
                    .find(&raw)
                    .ok_or(OpenError::FailedResolvePath(raw))?;
                let line = line
                    .as_ref()
                    .map(|template| m.expand(template))
                    .filter(|l| !l.is_empty());
                Ok(OpenAction::OpenFile { path, line })
            }
            Self::Command(argv) => Ok(OpenAction::RunCommand {
                argv: argv.iter().map(|arg| m.expand(arg)).collect(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{load, SchemeDef};
    use crate::error::ConfigError;
    use crate::open::OpenAction;
    use crate::scheme::tests::{ctx, NoPaths};
    use crate::scheme::OpenKind;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Wrapper {
        schemes: Vec<SchemeDef>,
    }

    fn parse(toml_src: &str) -> Vec<SchemeDef> {
        toml::from_str::<Wrapper>(toml_src).unwrap().schemes
    }

    #[test]
    fn browser_scheme_expands_target_template() {
        let defs = parse(
            r#"
            [[schemes]]
            tags = ["jira"]
            patterns = ['\b(?P<key>[A-Z]{2,}-\d+)\b']
            display = "ticket ${key}"
            target = "https://jira.example.com/browse/${key}"
            "#,
        );
        let schemes = load(&defs).unwrap();
        let paths = NoPaths;
        let c = ctx(&paths);
        let m = schemes[0].find_at("fixes OPS-42 today", 0).unwrap();
        assert_eq!(schemes[0].label(&m, &c).unwrap().display_text, "ticket OPS-42");
        assert_eq!(
            schemes[0].action(&m, &c).unwrap(),
            OpenAction::OpenUrl {
                url: "https://jira.example.com/browse/OPS-42".to_string()
            }
        );
    }

    #[test]
    fn custom_scheme_expands_command() {
        let defs = parse(
            r#"
            [[schemes]]
            tags = ["pr"]
            patterns = ['#(?P<num>\d+)']
            opener = "custom"
            command = ["gh", "pr", "view", "--web", "$num"]
            "#,
        );
        let schemes = load(&defs).unwrap();
        assert_eq!(schemes[0].open_kind(), OpenKind::Custom);
        let paths = NoPaths;
        let m = schemes[0].find_at("merged #1234", 0).unwrap();
        assert_eq!(
            schemes[0].action(&m, &ctx(&paths)).unwrap(),
            OpenAction::RunCommand {
                argv: ["gh", "pr", "view", "--web", "1234"].map(str::to_string).to_vec()
            }
        );
    }

    #[test]
    fn custom_scheme_needs_a_command() {
        let defs = parse(
            r#"
            [[schemes]]
            tags = ["pr"]
            patterns = ['#\d+']
            opener = "custom"
            "#,
        );
        assert!(matches!(load(&defs), Err(ConfigError::MissingPostHandler(_))));
    }

    #[test]
    fn bad_patterns_and_tags_are_config_errors() {
        let bad_regex = parse("[[schemes]]\ntags = [\"x\"]\npatterns = ['(']\n");
        assert!(matches!(load(&bad_regex), Err(ConfigError::InvalidPattern { .. })));

        let no_tags = parse("[[schemes]]\ntags = []\npatterns = ['x']\n");
        assert!(matches!(
            load(&no_tags),
            Err(ConfigError::InvalidScheme { index: 0, source })
                if matches!(*source, ConfigError::MalformedScheme { .. })
        ));
    }

    #[test]
    fn missing_fields_fail_to_parse() {
        let result = toml::from_str::<Wrapper>("[[schemes]]\ntags = [\"x\"]\n");
        assert!(result.is_err());
        let result = toml::from_str::<Wrapper>("[[schemes]]\ntags = \"x\"\npatterns = ['x']\n");
        assert!(result.is_err());
    }
}
