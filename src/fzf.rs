use crate::error::SelectorError;
use crate::open::Launcher;
use crate::resolve::Modifier;
use std::io::Write;
use std::process::Stdio;
use tracing::debug;

const COPY_KEY: &str = "alt-enter";
const HEADER: &str = "enter: open, alt-enter: copy to tmux buffer, tab: multi-select";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub lines: Vec<String>,
    pub modifier: Modifier,
}

pub trait Selector {
    fn select(&mut self, lines: &[String]) -> Result<Selection, SelectorError>;
}

pub struct FzfSelector {
    program: String,
    display_options: String,
    ansi: bool,
    show_header: bool,
    launcher: Launcher,
}

impl FzfSelector {
    pub fn new(program: &str, display_options: &str, ansi: bool, show_header: bool, launcher: Launcher) -> Self {
        Self {
            program: program.to_string(),
            display_options: display_options.to_string(),
            ansi,
            show_header,
            launcher,
        }
    }

    fn args(&self) -> Result<Vec<String>, SelectorError> {
        let mut args = shell_words::split(&self.display_options)
            .map_err(|e| SelectorError::Failed(format!("bad display options: {e}")))?;
        args.extend(["--multi", "--no-sort"].map(str::to_string));
        args.push(format!("--expect={COPY_KEY}"));
        if self.ansi {
            args.push("--ansi".to_string());
        }
        if self.show_header {
            args.push(format!("--header={HEADER}"));
        }
        Ok(args)
    }
}

impl Selector for FzfSelector {
    fn select(&mut self, lines: &[String]) -> Result<Selection, SelectorError> {
        let args = self.args()?;
        debug!(program = %self.program, ?args, "starting selector");
        let mut child = self
            .launcher
            .command(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            let input = lines.join("\n");
            // fzf may exit before reading everything (e.g. -0/-1 flags)
            if let Err(e) = stdin.write_all(input.as_bytes()) {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(e.into());
                }
            }
        }

        let output = child.wait_with_output()?;
        outcome(output.status.code(), &String::from_utf8_lossy(&output.stdout))
    }
}

/// Maps the selector's exit code onto a selection. `None` means it was
/// killed by a signal.
fn outcome(code: Option<i32>, stdout: &str) -> Result<Selection, SelectorError> {
    match code {
        Some(0) => Ok(parse_output(stdout)),
        Some(1) => Ok(Selection {
            lines: Vec::new(),
            modifier: Modifier::None,
        }),
        Some(130) | None => Err(SelectorError::Interrupted),
        Some(code) => Err(SelectorError::Failed(format!("exit status {code}"))),
    }
}

/// With `--expect`, fzf prints the key that closed it on the first line
/// (empty for plain enter) followed by one line per selected entry.
pub fn parse_output(stdout: &str) -> Selection {
    let mut lines = stdout.lines();
    let modifier = match lines.next() {
        Some(COPY_KEY) => Modifier::Copy,
        _ => Modifier::None,
    };
    Selection {
        lines: lines.filter(|l| !l.is_empty()).map(str::to_string).collect(),
        modifier,
    }
}
