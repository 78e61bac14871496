use crate::model::{Issue, IssueKind};
use std::collections::HashSet;

/// Drops every issue whose `(kind, snippet)` was already seen, keeping the
/// first occurrence and the original order.
///
/// Pages built from one template repeat the same markup, so a defect in the
/// template collapses into a single entry. The URL is not part of the key.
pub fn dedupe(issues: Vec<Issue>) -> Vec<Issue> {
    let mut seen: HashSet<(IssueKind, String)> = HashSet::with_capacity(issues.len());
    issues
        .into_iter()
        .filter(|issue| seen.insert((issue.kind, issue.snippet.clone())))
        .collect()
}
