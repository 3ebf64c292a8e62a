use crate::error::ConfigError;
use crate::scheme::{OpenKind, Scheme};
use std::collections::{HashMap, HashSet};
use tracing::debug;

#[derive(Debug)]
pub struct Registry {
    schemes: Vec<Scheme>,
    tag_index: HashMap<String, usize>,
}

impl Registry {
    /// User schemes come first and claim their tags; any later scheme that
    /// reuses a claimed or suppressed tag is left out entirely.
    pub fn build(builtins: Vec<Scheme>, user: Vec<Scheme>, suppressed: &[String]) -> Result<Self, ConfigError> {
        let mut claimed: HashSet<String> = HashSet::new();
        let mut schemes = Vec::new();

        for scheme in user.into_iter().chain(builtins) {
            let shadowed = scheme
                .tags()
                .iter()
                .any(|tag| claimed.contains(tag) || suppressed.contains(tag));
            if shadowed {
                debug!(tags = ?scheme.tags(), "scheme shadowed or suppressed");
                continue;
            }
            if scheme.open_kind() == OpenKind::Custom && !scheme.has_resolver() {
                return Err(ConfigError::MissingPostHandler(scheme.tags().to_vec()));
            }
            claimed.extend(scheme.tags().iter().cloned());
            schemes.push(scheme);
        }

        let tag_index = schemes
            .iter()
            .enumerate()
            .flat_map(|(i, scheme)| scheme.tags().iter().map(move |tag| (tag.clone(), i)))
            .collect();

        Ok(Self { schemes, tag_index })
    }

    pub fn schemes(&self) -> &[Scheme] {
        &self.schemes
    }

    pub fn by_tag(&self, tag: &str) -> Option<&Scheme> {
        self.tag_index.get(tag).map(|&i| &self.schemes[i])
    }
}

#[cfg(test)]
mod tests {
    use super::Registry;
    use crate::builtin::default_schemes;
    use crate::error::ConfigError;
    use crate::scheme::tests::scheme;
    use crate::scheme::OpenKind;

    fn primary_tags(registry: &Registry) -> Vec<&str> {
        registry.schemes().iter().map(|s| s.primary_tag()).collect()
    }

    #[test]
    fn builtins_alone_keep_baseline_order() {
        let registry = Registry::build(default_schemes().unwrap(), Vec::new(), &[]).unwrap();
        assert_eq!(primary_tags(&registry), ["url", "file", "git", "code err."]);
        assert_eq!(registry.by_tag("Python").unwrap().primary_tag(), "code err.");
        assert_eq!(registry.by_tag("dir").unwrap().primary_tag(), "file");
    }

    #[test]
    fn user_scheme_reusing_a_tag_replaces_the_builtin() {
        let user = scheme(&["url"], &[r"www\.\S+"], OpenKind::Browser);
        let registry = Registry::build(default_schemes().unwrap(), vec![user], &[]).unwrap();
        assert_eq!(primary_tags(&registry), ["url", "file", "git", "code err."]);
        assert!(registry.by_tag("url").unwrap().find_at("https://x.org", 0).is_none());
    }

    #[test]
    fn partial_tag_overlap_shadows_the_whole_builtin() {
        let user = scheme(&["mine", "dir"], &[r"\S+/"], OpenKind::Editor);
        let registry = Registry::build(default_schemes().unwrap(), vec![user], &[]).unwrap();
        assert_eq!(primary_tags(&registry), ["mine", "url", "git", "code err."]);
        assert!(registry.by_tag("file").is_none());
        assert_eq!(registry.by_tag("dir").unwrap().primary_tag(), "mine");
    }

    #[test]
    fn suppressed_tags_remove_builtins() {
        let registry =
            Registry::build(default_schemes().unwrap(), Vec::new(), &["git".to_string()]).unwrap();
        assert_eq!(primary_tags(&registry), ["url", "file", "code err."]);
        assert!(registry.by_tag("git").is_none());
    }

    #[test]
    fn earlier_user_scheme_wins_over_later_one() {
        let first = scheme(&["jira"], &[r"[A-Z]+-\d+"], OpenKind::Browser);
        let second = scheme(&["jira"], &[r"#\d+"], OpenKind::Browser);
        let registry = Registry::build(Vec::new(), vec![first, second], &[]).unwrap();
        assert_eq!(registry.schemes().len(), 1);
        assert!(registry.by_tag("jira").unwrap().find_at("ABC-12", 0).is_some());
    }

    #[test]
    fn custom_scheme_without_resolver_is_a_config_error() {
        let user = scheme(&["run"], &[r"\S+"], OpenKind::Custom);
        let err = Registry::build(Vec::new(), vec![user], &[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingPostHandler(_)));
    }
}
