use crate::user_schemes::SchemeDef;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub history_lines: u32,
    pub editor_open_cmd: String,
    pub browser_open_cmd: String,
    pub fzf_command: String,
    pub fzf_display_options: String,
    pub hide_fzf_header: bool,
    pub colors: bool,
    pub ls_colors: bool,
    pub ls_colors_file: Option<PathBuf>,
    pub path_extension: Option<String>,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    pub log_file_level: Option<String>,
    pub suppress: Vec<String>,
    pub schemes: Vec<SchemeDef>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_lines: 1000,
            editor_open_cmd: format!("tmux new-window -n editor {} +%line %file", default_editor()),
            browser_open_cmd: String::new(),
            fzf_command: "fzf-tmux".to_string(),
            fzf_display_options: "-w 100% -h 50% --no-preview".to_string(),
            hide_fzf_header: false,
            colors: true,
            ls_colors: false,
            ls_colors_file: None,
            path_extension: None,
            log_level: "info".to_string(),
            log_file: None,
            log_file_level: None,
            suppress: Vec::new(),
            schemes: Vec::new(),
        }
    }
}

fn default_editor() -> String {
    env::var("EDITOR").unwrap_or_else(|_| "nvim".to_string())
}

#[derive(Debug, Clone, Deserialize)]
struct PartialConfig {
    history_lines: Option<u32>,
    editor_open_cmd: Option<String>,
    browser_open_cmd: Option<String>,
    fzf_command: Option<String>,
    fzf_display_options: Option<String>,
    hide_fzf_header: Option<bool>,
    colors: Option<bool>,
    ls_colors: Option<bool>,
    ls_colors_file: Option<PathBuf>,
    path_extension: Option<String>,
    log_level: Option<String>,
    log_file: Option<PathBuf>,
    log_file_level: Option<String>,
    suppress: Option<Vec<String>>,
    schemes: Option<Vec<SchemeDef>>,
}

impl PartialConfig {
    /// Fills in missing keys from the defaults. The flag reports whether any
    /// key the user is expected to see in the file was missing.
    fn apply_defaults(self) -> (Config, bool) {
        let defaults = Config::default();
        let mut changed = false;

        let history_lines = match self.history_lines {
            Some(v) => v,
            None => {
                changed = true;
                defaults.history_lines
            }
        };
        let editor_open_cmd = match self.editor_open_cmd {
            Some(v) => v,
            None => {
                changed = true;
                defaults.editor_open_cmd
            }
        };
        let browser_open_cmd = match self.browser_open_cmd {
            Some(v) => v,
            None => {
                changed = true;
                defaults.browser_open_cmd
            }
        };
        let fzf_command = match self.fzf_command {
            Some(v) => v,
            None => {
                changed = true;
                defaults.fzf_command
            }
        };
        let fzf_display_options = match self.fzf_display_options {
            Some(v) => v,
            None => {
                changed = true;
                defaults.fzf_display_options
            }
        };
        let hide_fzf_header = match self.hide_fzf_header {
            Some(v) => v,
            None => {
                changed = true;
                defaults.hide_fzf_header
            }
        };
        let colors = match self.colors {
            Some(v) => v,
            None => {
                changed = true;
                defaults.colors
            }
        };
        let ls_colors = match self.ls_colors {
            Some(v) => v,
            None => {
                changed = true;
                defaults.ls_colors
            }
        };
        let log_level = match self.log_level {
            Some(v) => v,
            None => {
                changed = true;
                defaults.log_level
            }
        };
        let suppress = match self.suppress {
            Some(v) => v,
            None => {
                changed = true;
                defaults.suppress
            }
        };

        (
            Config {
                history_lines,
                editor_open_cmd,
                browser_open_cmd,
                fzf_command,
                fzf_display_options,
                hide_fzf_header,
                colors,
                ls_colors,
                ls_colors_file: self.ls_colors_file,
                path_extension: self.path_extension,
                log_level,
                log_file: self.log_file,
                log_file_level: self.log_file_level,
                suppress,
                schemes: self.schemes.unwrap_or_default(),
            },
            changed,
        )
    }
}

pub fn config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine config directory")?;
    Ok(base.join("panelinks").join("config.toml"))
}

pub fn ensure_config_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}

/// Loads the config at `path`, writing defaults for a missing file or for
/// missing keys so the file documents every setting.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        let cfg = Config::default();
        write_config(path, &cfg)?;
        return Ok(cfg);
    }

    let raw = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let (cfg, changed) = parse_config(&raw).with_context(|| format!("Failed to parse {}", path.display()))?;
    if changed {
        write_config(path, &cfg)?;
    }
    Ok(cfg)
}

fn parse_config(raw: &str) -> Result<(Config, bool)> {
    let partial: PartialConfig = toml::from_str(raw)?;
    Ok(partial.apply_defaults())
}

pub fn write_config(path: &Path, cfg: &Config) -> Result<()> {
    ensure_config_dir(path)?;
    let text = toml::to_string_pretty(cfg).context("Failed to serialize config")?;
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

pub fn open_config_in_editor(path: &Path) -> Result<()> {
    if !path.exists() {
        write_config(path, &Config::default())?;
    }

    let editor = default_editor();
    let mut parts = match shell_words::split(&editor) {
        Ok(p) if !p.is_empty() => p,
        _ => vec![editor],
    };
    let cmd = parts.remove(0);
    let status = Command::new(cmd)
        .args(parts)
        .arg(path)
        .status()
        .with_context(|| format!("Failed to launch editor for {}", path.display()))?;
    if !status.success() {
        anyhow::bail!("Editor exited with status {}", status);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{load_config, parse_config, Config};
    use crate::scheme::OpenKind;
    use std::fs;

    #[test]
    fn missing_keys_are_filled_and_flagged() {
        let (cfg, changed) = parse_config("history_lines = 200\n").unwrap();
        assert!(changed);
        assert_eq!(cfg.history_lines, 200);
        assert_eq!(cfg.fzf_command, Config::default().fzf_command);
        assert!(cfg.colors);
    }

    #[test]
    fn optional_keys_do_not_force_a_rewrite() {
        let full = toml::to_string_pretty(&Config::default()).unwrap();
        let (_, changed) = parse_config(&full).unwrap();
        assert!(!changed);
    }

    #[test]
    fn user_schemes_and_suppressions_are_read() {
        let raw = r#"
suppress = ["git"]

[[schemes]]
tags = ["ticket"]
patterns = ['[A-Z]+-\d+']
opener = "browser"
target = "https://tracker.example/$0"
"#;
        let (cfg, _) = parse_config(raw).unwrap();
        assert_eq!(cfg.suppress, ["git"]);
        assert_eq!(cfg.schemes.len(), 1);
        assert_eq!(cfg.schemes[0].opener, OpenKind::Browser);
    }

    #[test]
    fn ls_colors_and_file_log_level_are_read() {
        let raw = r#"
ls_colors = true
ls_colors_file = "/tmp/dircolors"
log_level = "warn"
log_file_level = "debug"
"#;
        let (cfg, _) = parse_config(raw).unwrap();
        assert!(cfg.ls_colors);
        assert_eq!(cfg.ls_colors_file.as_deref(), Some(std::path::Path::new("/tmp/dircolors")));
        assert_eq!(cfg.log_level, "warn");
        assert_eq!(cfg.log_file_level.as_deref(), Some("debug"));

        let (defaults, _) = parse_config("").unwrap();
        assert!(!defaults.ls_colors);
        assert!(defaults.log_file_level.is_none());
    }

    #[test]
    fn wrong_types_are_rejected() {
        assert!(parse_config("colors = \"yes\"\n").is_err());
        assert!(parse_config("[[schemes]]\npatterns = ['x']\n").is_err());
    }

    #[test]
    fn load_writes_defaults_for_a_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.history_lines, 1000);
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("fzf_command"));
    }
}
