use crate::registry::Registry;
use crate::scanner::{Candidate, Scanner};
use crate::scheme::HandlerContext;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Runs every scheme in registry order. The first scheme to accept a given
/// raw text owns it; later schemes matching the same text are ignored.
pub fn collect(text: &str, registry: &Registry, ctx: HandlerContext<'_>) -> Vec<Candidate> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut items = Vec::new();

    for scheme in registry.schemes() {
        for candidate in Scanner::new(scheme, text, ctx) {
            if seen.contains(&candidate.raw) {
                continue;
            }
            if !scheme.owns_tag(&candidate.tag) {
                warn!(
                    "the dynamically returned '{}' is not included in: {:?}",
                    candidate.tag,
                    scheme.tags()
                );
                continue;
            }
            seen.insert(candidate.raw.clone());
            items.push(candidate);
        }
    }

    debug!(count = items.len(), "collected candidates");
    items
}

#[cfg(test)]
mod tests {
    use super::collect;
    use crate::builtin::default_schemes;
    use crate::registry::Registry;
    use crate::scheme::tests::{ctx, scheme, NoPaths};
    use crate::scheme::{validate_with, Labeled, OpenKind};

    #[test]
    fn first_scheme_owns_shared_text() {
        let a = scheme(&["a"], &[r"http://\S+"], OpenKind::Browser);
        let b = scheme(&["b"], &[r"\S+"], OpenKind::Browser);
        let registry = Registry::build(Vec::new(), vec![a, b], &[]).unwrap();
        let paths = NoPaths;
        let found = collect("http://x", &registry, ctx(&paths));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].tag, "a");
    }

    #[test]
    fn same_text_twice_is_listed_once() {
        let registry = Registry::build(default_schemes().unwrap(), Vec::new(), &[]).unwrap();
        let paths = NoPaths;
        let found = collect("http://x.io\nagain http://x.io\n", &registry, ctx(&paths));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].start, 0);
    }

    #[test]
    fn foreign_tags_are_skipped_without_claiming_text() {
        let rogue = scheme(&["rogue"], &[r"\d+"], OpenKind::Browser)
            .with_validator(validate_with(|m, _| Some(Labeled::new(m.as_str(), "other"))));
        let fallback = scheme(&["num"], &[r"\d+"], OpenKind::Browser);
        let registry = Registry::build(Vec::new(), vec![rogue, fallback], &[]).unwrap();
        let paths = NoPaths;
        let found = collect("12 34", &registry, ctx(&paths));
        let tags: Vec<&str> = found.iter().map(|c| c.tag.as_str()).collect();
        assert_eq!(tags, ["num", "num"]);
    }

    #[test]
    fn no_matches_is_an_empty_list() {
        let registry = Registry::build(default_schemes().unwrap(), Vec::new(), &[]).unwrap();
        let paths = NoPaths;
        assert!(collect("nothing to see", &registry, ctx(&paths)).is_empty());
    }

    #[test]
    fn lone_dot_produces_nothing() {
        let registry = Registry::build(default_schemes().unwrap(), Vec::new(), &[]).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let finder = crate::paths::HeuristicFinder::new(dir.path().to_path_buf());
        assert!(collect(".", &registry, ctx(&finder)).is_empty());
    }
}
