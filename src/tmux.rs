use crate::open::{Launcher, OpenAction};
use anyhow::{bail, Context, Result};
use std::path::PathBuf;

pub struct Tmux<'a> {
    launcher: &'a Launcher,
}

impl<'a> Tmux<'a> {
    pub fn new(launcher: &'a Launcher) -> Self {
        Self { launcher }
    }

    fn output(&self, args: &[&str]) -> Result<String> {
        let output = self
            .launcher
            .command("tmux")
            .args(args)
            .output()
            .context("Failed to run tmux (is it installed?)")?;
        if !output.status.success() {
            bail!(
                "tmux {} failed with status {}: {}",
                args.first().unwrap_or(&""),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Joined, escape-preserving capture of the pane plus its scrollback.
    pub fn capture_pane(&self, history_lines: u32) -> Result<String> {
        let start = format!("-{history_lines}");
        self.output(&["capture-pane", "-J", "-p", "-e", "-S", &start])
    }

    pub fn pane_current_path(&self) -> Result<PathBuf> {
        let path = self.output(&["display", "-p", "#{pane_current_path}"])?;
        Ok(PathBuf::from(path.trim()))
    }
}

/// The command that stores `entries` in the tmux paste buffer (and the system
/// clipboard, via `-w`) and reports it in the status line.
pub fn set_buffer_action(entries: &[String]) -> OpenAction {
    let plural = if entries.len() > 1 { "s" } else { "" };
    OpenAction::RunCommand {
        argv: vec![
            "tmux".to_string(),
            "set-buffer".to_string(),
            "-w".to_string(),
            entries.join("\n"),
            ";".to_string(),
            "display-message".to_string(),
            format!("copied selection{plural} to tmux buffer"),
        ],
    }
}
