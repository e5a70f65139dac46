//! Best-effort rewrite of quoted project clauses.
//!
//! `project = "Some Name"` is replaced with `project = KEY` so the query does
//! not depend on how the tracker resolves quoted display names. Only that one
//! shape is recognised; anything else passes through unchanged.

use regex::{NoExpand, Regex};
use std::sync::LazyLock;

static QUOTED_PROJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bproject\s*=\s*"[^"]*""#).expect("static regex")
});

pub fn rewrite_project_clause(jql: &str, key: &str) -> String {
    let replacement = format!("project = {}", key);
    QUOTED_PROJECT
        .replace_all(jql, NoExpand(&replacement))
        .into_owned()
}
