//! Branch-listing parse and checkout planning.

use std::collections::HashSet;

/// Deduplicated, order-preserving branch names plus the checked-out
/// branch (empty when the listing carried no `*` marker).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchSet {
    names: Vec<String>,
    current: String,
}

impl BranchSet {
    /// Parse `git branch -a` style output.
    ///
    /// A `*` prefix marks the current branch. Slash-delimited refs
    /// collapse to their final segment, so `remotes/origin/dev` lists as
    /// `dev`. Duplicates keep their first-seen position; empty names are
    /// dropped.
    pub fn parse(raw: &str) -> Self {
        let mut names = Vec::new();
        let mut seen = HashSet::new();
        let mut current = String::new();

        for line in raw.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let name = if let Some(rest) = line.strip_prefix('*') {
                let name = rest.trim_start_matches('*').trim().to_string();
                current = name.clone();
                name
            } else if let Some(idx) = line.rfind('/') {
                line[idx + 1..].to_string()
            } else {
                line.to_string()
            };

            if name.is_empty() || !seen.insert(name.clone()) {
                continue;
            }
            names.push(name);
        }

        Self { names, current }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The checked-out branch, or `""` when undetermined.
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, name: &str) -> bool {
        let needle = name.trim().to_lowercase();
        self.names.iter().any(|n| n.to_lowercase() == needle)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// What the checkout facade should do for a requested branch name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutAction {
    /// Branch exists: plain switch.
    Switch,
    /// Branch unknown: create it and switch.
    CreateAndSwitch,
    /// Blank request: nothing to do.
    NoOp,
}

/// Decide how to reach `name` given the known branches. Pure decision;
/// the caller performs the chosen invocation.
pub fn plan_checkout(name: &str, branches: &BranchSet) -> CheckoutAction {
    if name.trim().is_empty() {
        CheckoutAction::NoOp
    } else if branches.contains(name) {
        CheckoutAction::Switch
    } else {
        CheckoutAction::CreateAndSwitch
    }
}
