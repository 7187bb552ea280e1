// src/watch/patterns.rs

//! Cascading glob rules deciding which tasks a changed path invalidates.
//!
//! A rule list is evaluated top to bottom and the *last* matching rule wins.
//! A rule prefixed with `!` excludes instead of includes. A path no rule
//! matches is not matched. Patterns are relative to the project root and `*`
//! does not cross `/` (use `**` for that):
//!
//! ```toml
//! watch = ["**/*.go", "!**/*_test.go", "testdata/golden_test.go"]
//! ```

use std::fmt;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::config::model::{ConfigFile, TaskConfig};
use crate::errors::{CrankError, Result};

#[derive(Clone)]
pub struct PathMatcher {
    patterns: Vec<String>,
    set: GlobSet,
    /// `true` for rules starting with `!`, indexed like the glob set.
    negated: Vec<bool>,
}

impl fmt::Debug for PathMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathMatcher")
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl Default for PathMatcher {
    fn default() -> Self {
        Self::empty()
    }
}

impl PathMatcher {
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let mut builder = GlobSetBuilder::new();
        let mut negated = Vec::with_capacity(patterns.len());

        for pat in &patterns {
            let (neg, body) = match pat.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, pat.as_str()),
            };
            let glob = GlobBuilder::new(body)
                .literal_separator(true)
                .build()
                .map_err(|e| CrankError::Pattern(format!("'{pat}': {e}")))?;
            builder.add(glob);
            negated.push(neg);
        }

        let set = builder
            .build()
            .map_err(|e| CrankError::Pattern(e.to_string()))?;

        Ok(Self {
            patterns,
            set,
            negated,
        })
    }

    /// Matches nothing.
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
            set: GlobSet::empty(),
            negated: Vec::new(),
        }
    }

    /// `rel_path` uses forward slashes and is relative to the project root.
    pub fn matches(&self, rel_path: &str) -> bool {
        match self.set.matches(rel_path).into_iter().max() {
            Some(last) => !self.negated[last],
            None => false,
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Effective rule list for a task.
///
/// - `watch` set and `append_default_watch`: task rules, then default rules.
/// - `watch` set: task rules only.
/// - otherwise: default rules.
pub fn effective_patterns(task: &TaskConfig, default_watch: &[String]) -> Vec<String> {
    match (&task.watch, task.append_default_watch) {
        (Some(list), true) => list.iter().chain(default_watch).cloned().collect(),
        (Some(list), false) => list.clone(),
        (None, _) => default_watch.to_vec(),
    }
}

/// Compile the matcher for one configured task.
pub fn task_matcher(cfg: &ConfigFile, name: &str) -> Result<PathMatcher> {
    let task = cfg
        .task(name)
        .ok_or_else(|| CrankError::TaskNotFound(name.to_string()))?;
    PathMatcher::new(effective_patterns(task, &cfg.default_section().watch))
}

/// Matcher for `[default].ignore`. Plain include rules, so any match ignores.
pub fn ignore_matcher(cfg: &ConfigFile) -> Result<PathMatcher> {
    PathMatcher::new(cfg.default_section().ignore.iter().cloned())
}
