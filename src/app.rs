use crate::builtin::default_schemes;
use crate::collect::collect;
use crate::config::Config;
use crate::error::SelectorError;
use crate::fzf::{FzfSelector, Selector};
use crate::open::{Launcher, Opener, SystemOpener};
use crate::paths::HeuristicFinder;
use crate::present::present;
use crate::registry::Registry;
use crate::resolve::SelectionResolver;
use crate::scheme::{HandlerContext, OpenKind};
use crate::text::sanitize;
use crate::theme::{load_ls_colors, Palette};
use crate::tmux::{set_buffer_action, Tmux};
use crate::user_schemes;
use anyhow::{anyhow, Context, Result};
use std::env;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

pub fn build_registry(config: &Config) -> Result<Registry> {
    let builtins = default_schemes().context("Invalid built-in scheme")?;
    let user = user_schemes::load(&config.schemes).context("Invalid user scheme")?;
    let registry = Registry::build(builtins, user, &config.suppress).context("Invalid user scheme")?;
    Ok(registry)
}

fn build_palette(config: &Config) -> Palette {
    let palette = Palette::new(config.colors);
    if !(config.colors && config.ls_colors) {
        return palette;
    }
    match load_ls_colors(config.ls_colors_file.as_deref()) {
        Ok(files) => palette.with_file_colors(files),
        Err(e) => {
            warn!("LS_COLORS not configured: {e:#}");
            palette
        }
    }
}

/// Interactive run against the current tmux pane.
pub fn run_app(config: Config) -> Result<()> {
    let launcher = Launcher::new(config.path_extension.as_deref());
    let tmux = Tmux::new(&launcher);

    let content = sanitize(&tmux.capture_pane(config.history_lines)?);
    let registry = build_registry(&config)?;

    let pane_path = tmux
        .pane_current_path()
        .context("current directory could not be changed")?;
    env::set_current_dir(&pane_path)
        .with_context(|| format!("current directory could not be changed to {}", pane_path.display()))?;

    let palette = build_palette(&config);
    let finder = HeuristicFinder::new(pane_path);
    let ctx = HandlerContext {
        paths: &finder,
        palette: &palette,
        editor_cmd: &config.editor_open_cmd,
    };

    let candidates = collect(&content, &registry, ctx);
    if candidates.is_empty() {
        info!("no link found");
        return Ok(());
    }
    let shown = present(candidates, &palette);

    let mut selector = FzfSelector::new(
        &config.fzf_command,
        &config.fzf_display_options,
        config.colors,
        !config.hide_fzf_header,
        launcher.clone(),
    );
    let selection = match selector.select(&shown.lines) {
        Ok(selection) => selection,
        Err(SelectorError::Interrupted) => return Ok(()),
        Err(e) => return Err(anyhow!("unexpected error: {e}")),
    };

    let mut opener = SystemOpener::new(&config.editor_open_cmd, &config.browser_open_cmd, launcher);
    let resolver = SelectionResolver::new(&registry, &shown.candidates, ctx);
    let clipboard = resolver.process(&selection.lines, selection.modifier, &mut opener);

    if !clipboard.is_empty() {
        if let Err(e) = opener.open(OpenKind::Custom, &set_buffer_action(&clipboard)) {
            error!("error: {e}");
        }
    }
    Ok(())
}

/// Non-interactive scan of a file (or stdin): prints the numbered lines the
/// selector would be offered, without colors.
pub fn run_scan(config: &Config, input: Option<&Path>) -> Result<()> {
    let raw = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };
    let content = sanitize(&raw);
    let registry = build_registry(config)?;

    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let palette = Palette::plain();
    let finder = HeuristicFinder::new(cwd);
    let ctx = HandlerContext {
        paths: &finder,
        palette: &palette,
        editor_cmd: &config.editor_open_cmd,
    };

    for line in present(collect(&content, &registry, ctx), &palette).lines {
        println!("{line}");
    }
    Ok(())
}

pub fn list_schemes(config: &Config) -> Result<()> {
    let registry = build_registry(config)?;
    for (i, scheme) in registry.schemes().iter().enumerate() {
        println!("{:2}. [{}] ({})", i + 1, scheme.tags().join(", "), scheme.open_kind());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{build_palette, build_registry};
    use crate::config::Config;
    use std::fs;
    use crate::user_schemes::SchemeDef;

    fn def(tags: &[&str], pattern: &str) -> SchemeDef {
        SchemeDef {
            tags: tags.iter().map(|t| t.to_string()).collect(),
            patterns: vec![pattern.to_string()],
            opener: crate::scheme::OpenKind::Browser,
            display: None,
            target: None,
            line: None,
            command: None,
        }
    }

    #[test]
    fn config_schemes_take_precedence() {
        let config = Config {
            schemes: vec![def(&["url"], r"www\.\S+"), def(&["ticket"], r"[A-Z]+-\d+")],
            suppress: vec!["git".to_string()],
            ..Config::default()
        };
        let registry = build_registry(&config).unwrap();
        let primary: Vec<&str> = registry.schemes().iter().map(|s| s.primary_tag()).collect();
        assert_eq!(primary, ["url", "ticket", "file", "code err."]);
    }

    #[test]
    fn malformed_config_scheme_is_fatal() {
        let config = Config {
            schemes: vec![def(&["broken"], "(")],
            ..Config::default()
        };
        assert!(build_registry(&config).is_err());
    }

    #[test]
    fn ls_colors_load_only_when_requested() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("ls_colors");
        fs::write(&file, "*.rs=31\n").unwrap();

        let off = Config {
            ls_colors_file: Some(file.clone()),
            ..Config::default()
        };
        assert!(build_palette(&off).files.is_none());

        let on = Config {
            ls_colors: true,
            ls_colors_file: Some(file.clone()),
            ..Config::default()
        };
        assert!(build_palette(&on).files.is_some());

        let uncolored = Config {
            colors: false,
            ..on.clone()
        };
        assert!(build_palette(&uncolored).files.is_none());

        let missing = Config {
            ls_colors: true,
            ls_colors_file: Some(dir.path().join("missing")),
            ..Config::default()
        };
        assert!(build_palette(&missing).files.is_none());
    }
}
