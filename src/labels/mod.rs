//! Label inference
//!
//! Maps the paths touched by a pull request to subsystem labels.
//!
//! Resolution order:
//! 1. If every changed path is a test, doc or benchmark path, only those
//!    exclusive labels are used
//! 2. Otherwise every path is matched against the subsystem rules; when the
//!    change touches `lib/`, too many JS subsystems collapse into `lib / src`
//! 3. Pull requests against a release branch also get its version label

mod rules;

pub use rules::{is_js_subsystem, LabelSpec, Rule, RuleTable, JS_SUBSYSTEMS, LIB_SRC_LABEL};

use crate::config::LabelerConfig;
use crate::models::{ChangedFile, LabelSet};
use rules::{EXCLUSIVE_RULES, SUBSYSTEM_RULES, VERSION_BRANCH};

/// Derives labels from changed file paths
#[derive(Debug, Clone)]
pub struct LabelResolver {
    /// Distinct JS subsystem labels allowed before collapsing to `lib / src`
    js_subsystem_limit: usize,
    /// Whether to add release-branch version labels
    version_labels: bool,
}

impl Default for LabelResolver {
    fn default() -> Self {
        Self {
            js_subsystem_limit: 4,
            version_labels: true,
        }
    }
}

impl LabelResolver {
    pub fn new(js_subsystem_limit: usize, version_labels: bool) -> Self {
        Self {
            js_subsystem_limit,
            version_labels,
        }
    }

    pub fn from_config(config: &LabelerConfig) -> Self {
        Self::new(config.js_subsystem_limit, config.version_labels)
    }

    /// Resolve labels for a set of changed files
    pub fn resolve(&self, files: &[ChangedFile], base_branch: Option<&str>) -> LabelSet {
        let paths: Vec<&str> = files.iter().map(|f| f.filename.as_str()).collect();
        self.resolve_paths(&paths, base_branch)
    }

    /// Resolve labels for raw paths
    pub fn resolve_paths(&self, paths: &[&str], base_branch: Option<&str>) -> LabelSet {
        let mut labels = exclusive_labels(paths);
        if labels.is_empty() {
            labels = self.subsystem_labels(paths);
        }

        if self.version_labels {
            if let Some(version) = base_branch.and_then(version_label) {
                labels.insert(version);
            }
        }

        labels
    }

    fn subsystem_labels(&self, paths: &[&str]) -> LabelSet {
        let mut labels = LabelSet::new();
        let mut js_labels: Vec<String> = Vec::new();
        // only a change under lib/ counts towards the JS subsystem limit
        let touches_lib = paths.iter().any(|p| p.starts_with("lib/"));

        for path in paths {
            let Some(mapped) = SUBSYSTEM_RULES.labels_for(path) else {
                continue;
            };

            for label in mapped {
                if touches_lib && is_js_subsystem(&label) && !js_labels.contains(&label) {
                    js_labels.push(label.clone());
                }
                labels.insert(label);
            }
        }

        if js_labels.len() > self.js_subsystem_limit {
            for label in &js_labels {
                labels.remove(label);
            }
            labels.insert(LIB_SRC_LABEL);
        }

        labels
    }
}

/// Labels from the exclusive rules, empty unless every path matches one
fn exclusive_labels(paths: &[&str]) -> LabelSet {
    if paths.is_empty() || !paths.iter().all(|p| EXCLUSIVE_RULES.matches(p)) {
        return LabelSet::new();
    }

    let labels: LabelSet = paths
        .iter()
        .filter_map(|p| EXCLUSIVE_RULES.labels_for(p))
        .flatten()
        .collect();

    // Several API docs at once: keep only `doc` when they are all JS
    // subsystems, otherwise fall back to the subsystem rules
    if labels.contains("doc") && labels.len() > 2 {
        let all_js = labels
            .iter()
            .filter(|l| *l != "doc")
            .all(is_js_subsystem);
        return if all_js {
            ["doc"].into_iter().collect()
        } else {
            LabelSet::new()
        };
    }

    labels
}

fn version_label(branch: &str) -> Option<String> {
    VERSION_BRANCH
        .captures(branch)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}
