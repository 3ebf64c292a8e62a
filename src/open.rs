use crate::error::OpenError;
use crate::scheme::OpenKind;
use std::env;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenAction {
    OpenFile { path: PathBuf, line: Option<String> },
    OpenUrl { url: String },
    RunCommand { argv: Vec<String> },
}

impl fmt::Display for OpenAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenFile { path, line: Some(line) } => write!(f, "file {}:{line}", path.display()),
            Self::OpenFile { path, line: None } => write!(f, "file {}", path.display()),
            Self::OpenUrl { url } => write!(f, "url {url}"),
            Self::RunCommand { argv } => write!(f, "command {argv:?}"),
        }
    }
}

pub trait Opener {
    fn open(&mut self, kind: OpenKind, action: &OpenAction) -> Result<(), OpenError>;
}

/// Builds child processes with the configured `PATH` extension applied.
#[derive(Debug, Clone, Default)]
pub struct Launcher {
    path: Option<OsString>,
}

impl Launcher {
    pub fn new(path_extension: Option<&str>) -> Self {
        let path = path_extension.filter(|p| !p.is_empty()).map(|ext| {
            let current = env::var_os("PATH").unwrap_or_default();
            let already = env::split_paths(&current).any(|p| p.as_os_str() == OsStr::new(ext));
            if already {
                current
            } else {
                let mut joined = OsString::from(ext);
                if !current.is_empty() {
                    joined.push(":");
                    joined.push(&current);
                }
                joined
            }
        });
        Self { path }
    }

    pub fn command(&self, program: impl AsRef<OsStr>) -> Command {
        let mut cmd = Command::new(program);
        if let Some(path) = &self.path {
            cmd.env("PATH", path);
        }
        cmd
    }

    pub fn run(&self, argv: &[String]) -> Result<(), OpenError> {
        let Some((program, args)) = argv.split_first() else {
            return Err(OpenError::NoSuitableAppFound("empty command".to_string()));
        };
        debug!(?argv, "running command");
        let output = self
            .command(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => OpenError::NoSuitableAppFound(program.clone()),
                _ => OpenError::CommandFailed {
                    command: argv.join(" "),
                    reason: e.to_string(),
                },
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OpenError::CommandFailed {
                command: argv.join(" "),
                reason: format!("{} {}", output.status, stderr.trim()),
            });
        }
        Ok(())
    }
}

pub struct SystemOpener {
    editor_cmd: String,
    browser_cmd: String,
    launcher: Launcher,
}

impl SystemOpener {
    pub fn new(editor_cmd: &str, browser_cmd: &str, launcher: Launcher) -> Self {
        Self {
            editor_cmd: editor_cmd.to_string(),
            browser_cmd: browser_cmd.to_string(),
            launcher,
        }
    }
}

impl Opener for SystemOpener {
    fn open(&mut self, kind: OpenKind, action: &OpenAction) -> Result<(), OpenError> {
        let argv = command_for(kind, action, &self.editor_cmd, &self.browser_cmd)?;
        self.launcher.run(&argv)
    }
}

/// Maps an action onto the argv the opener for `kind` would run.
pub fn command_for(
    kind: OpenKind,
    action: &OpenAction,
    editor_cmd: &str,
    browser_cmd: &str,
) -> Result<Vec<String>, OpenError> {
    match (kind, action) {
        (OpenKind::Editor, OpenAction::OpenFile { path, line }) => {
            let file = path.to_string_lossy();
            editor_argv(editor_cmd, &file, line.as_deref().unwrap_or("1"))
        }
        (OpenKind::Browser, OpenAction::OpenUrl { url }) => {
            if browser_cmd.trim().is_empty() {
                let mut argv = platform_opener()?;
                argv.push(url.clone());
                return Ok(argv);
            }
            fill_template(browser_cmd, &[("%url", url)], url)
        }
        (OpenKind::Custom, OpenAction::RunCommand { argv }) => Ok(argv.clone()),
        (kind, action) => Err(OpenError::PatternNotMatching {
            kind: kind.to_string(),
            action: action.to_string(),
        }),
    }
}

pub fn editor_argv(editor_cmd: &str, file: &str, line: &str) -> Result<Vec<String>, OpenError> {
    fill_template(editor_cmd, &[("%file", file), ("%line", line)], file)
}

/// Splits `template` into words, then substitutes placeholders word by word
/// so a value containing spaces stays one argument. When the first
/// placeholder never appears, `fallback` is appended as the last argument.
fn fill_template(
    template: &str,
    values: &[(&str, &str)],
    fallback: &str,
) -> Result<Vec<String>, OpenError> {
    let words = split_command(template)?;
    let mut argv: Vec<String> = words
        .iter()
        .map(|word| {
            values
                .iter()
                .fold(word.clone(), |acc, (key, value)| acc.replace(key, value))
        })
        .collect();
    let primary = values.first().map_or("", |(key, _)| *key);
    if !words.iter().any(|w| w.contains(primary)) {
        argv.push(fallback.to_string());
    }
    Ok(argv)
}

fn split_command(cmd: &str) -> Result<Vec<String>, OpenError> {
    let argv = shell_words::split(cmd).map_err(|e| OpenError::CommandFailed {
        command: cmd.to_string(),
        reason: e.to_string(),
    })?;
    if argv.is_empty() {
        return Err(OpenError::NoSuitableAppFound(format!("empty command {cmd:?}")));
    }
    Ok(argv)
}

/// The OS command that hands a path or URL to its default application.
pub fn platform_opener() -> Result<Vec<String>, OpenError> {
    match env::consts::OS {
        "macos" => Ok(vec!["open".to_string()]),
        "linux" | "freebsd" | "openbsd" | "netbsd" => Ok(vec!["xdg-open".to_string()]),
        "windows" => Ok(vec!["explorer".to_string()]),
        other => Err(OpenError::NotSupportedPlatform(other)),
    }
}

/// Like [`platform_opener`], but reveals the entry in a file manager where
/// the platform supports it.
pub fn platform_revealer() -> Result<Vec<String>, OpenError> {
    match env::consts::OS {
        "macos" => Ok(vec!["open".to_string(), "-R".to_string()]),
        _ => platform_opener(),
    }
}
