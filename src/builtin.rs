//! Schemes shipped with the binary, in their baseline order.

use crate::error::{ConfigError, OpenError};
use crate::open::{editor_argv, platform_revealer, OpenAction};
use crate::paths::looks_binary;
use crate::scheme::{compile, HandlerContext, Labeled, OpenKind, Resolver, Scheme, SchemeMatch, Validator};
use regex::Regex;
use std::path::PathBuf;

const URL: &str = r"https?://(?:www\.)?[-a-zA-Z0-9@:%._\+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b[-a-zA-Z0-9()@:%_\+.~#?&//=]*";
const GIT: &str = r#"(ssh://)?git@(?P<server>[^ \t\n"'\)\]\}]+):(?P<repo>[^ .\t\n"'\)\]\}]+)"#;
const CODE_ERROR: &str = r#"File "(?P<file>...*?)", line (?P<line>[0-9]+)"#;
const FILE_AT_LINE_START: &str = r#"(?m)(?P<link>^[^<>:"\\|?*\x00-\x1F]+)(:(?P<line>\d+))?"#;
const FILE_QUOTED: &str = r#"'(?P<link>[^:'"|?*\x00-\x1F]+)'(:(?P<line>\d+))?"#;
const FILE_BARE: &str = r#"(?P<link>[^ :'"|?*\x00-\x1F]+)(:(?P<line>\d+))?"#;

pub fn default_schemes() -> Result<Vec<Scheme>, ConfigError> {
    Ok(vec![url()?, file()?, git()?, code_error()?])
}

fn scheme(tags: &[&str], sources: &[&str], kind: OpenKind) -> Result<Scheme, ConfigError> {
    let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
    let patterns = sources
        .iter()
        .map(|src| compile(&tags, src))
        .collect::<Result<Vec<Regex>, _>>()?;
    Scheme::new(tags, patterns, kind)
}

fn url() -> Result<Scheme, ConfigError> {
    Ok(scheme(&["url"], &[URL], OpenKind::Browser)?.with_validator(UrlLabel))
}

fn file() -> Result<Scheme, ConfigError> {
    Ok(scheme(
        &["file", "dir"],
        &[FILE_AT_LINE_START, FILE_QUOTED, FILE_BARE],
        OpenKind::Custom,
    )?
    .with_validator(FileLabel)
    .with_resolver(FileOpen))
}

fn git() -> Result<Scheme, ConfigError> {
    Ok(scheme(&["git"], &[GIT], OpenKind::Browser)?
        .with_validator(GitLabel)
        .with_resolver(GitUrl))
}

fn code_error() -> Result<Scheme, ConfigError> {
    Ok(scheme(&["code err.", "Python"], &[CODE_ERROR], OpenKind::Editor)?
        .with_validator(CodeErrorLabel)
        .with_resolver(CodeErrorOpen))
}

struct UrlLabel;

impl Validator for UrlLabel {
    fn validate(&self, m: &SchemeMatch<'_>, ctx: &HandlerContext<'_>) -> Option<Labeled> {
        Some(Labeled::new(ctx.palette.paint(m.as_str(), ctx.palette.url), "url"))
    }
}

struct GitLabel;

impl Validator for GitLabel {
    fn validate(&self, m: &SchemeMatch<'_>, ctx: &HandlerContext<'_>) -> Option<Labeled> {
        Some(Labeled::new(ctx.palette.paint(m.as_str(), ctx.palette.git), "git"))
    }
}

struct GitUrl;

impl Resolver for GitUrl {
    fn resolve(&self, m: &SchemeMatch<'_>, _ctx: &HandlerContext<'_>) -> Result<OpenAction, OpenError> {
        let (Some(server), Some(repo)) = (m.name("server"), m.name("repo")) else {
            return Err(OpenError::FailedResolvePath(m.as_str().to_string()));
        };
        Ok(OpenAction::OpenUrl {
            url: format!("https://{server}/{repo}"),
        })
    }
}

struct CodeErrorLabel;

impl Validator for CodeErrorLabel {
    fn validate(&self, m: &SchemeMatch<'_>, ctx: &HandlerContext<'_>) -> Option<Labeled> {
        let file = m.name("file")?;
        let line = m.name("line")?;
        let resolved = ctx.paths.find(file)?;
        let tag = match resolved.extension().and_then(|ext| ext.to_str()) {
            Some("py") => "Python",
            _ => "code err.",
        };
        let display = ctx
            .palette
            .paint(&format!("{file}, line {line}"), ctx.palette.code_error);
        Some(Labeled::new(display, tag))
    }
}

struct CodeErrorOpen;

impl Resolver for CodeErrorOpen {
    fn resolve(&self, m: &SchemeMatch<'_>, ctx: &HandlerContext<'_>) -> Result<OpenAction, OpenError> {
        let file = m.name("file").unwrap_or_default();
        let resolved = ctx
            .paths
            .find(file)
            .ok_or_else(|| OpenError::FailedResolvePath(file.to_string()))?;
        Ok(OpenAction::OpenFile {
            path: absolute(resolved),
            line: m.name("line").map(str::to_string),
        })
    }
}

struct FileLabel;

impl Validator for FileLabel {
    fn validate(&self, m: &SchemeMatch<'_>, ctx: &HandlerContext<'_>) -> Option<Labeled> {
        let link = m.name("link")?;
        // "." and ".." are everywhere in shell output and never worth a link
        if link.chars().all(|c| c == '.') {
            return None;
        }
        let resolved = ctx.paths.find(link)?;
        let tag = if resolved.is_dir() { "dir" } else { "file" };
        Some(Labeled::new(ctx.palette.paint_path(link, &resolved), tag))
    }
}

struct FileOpen;

impl Resolver for FileOpen {
    fn resolve(&self, m: &SchemeMatch<'_>, ctx: &HandlerContext<'_>) -> Result<OpenAction, OpenError> {
        let link = m.name("link").unwrap_or_default();
        let line = m.name("line").unwrap_or("1");
        let resolved = ctx
            .paths
            .find(link)
            .ok_or_else(|| OpenError::FailedResolvePath(link.to_string()))?;
        let resolved = absolute(resolved);

        let argv = if looks_binary(&resolved) {
            let mut argv = platform_revealer()?;
            argv.push(resolved.to_string_lossy().into_owned());
            argv
        } else {
            editor_argv(ctx.editor_cmd, &resolved.to_string_lossy(), line)?
        };
        Ok(OpenAction::RunCommand { argv })
    }
}

fn absolute(path: PathBuf) -> PathBuf {
    path.canonicalize().unwrap_or(path)
}
