//! Naming and classification.
//!
//! Pure functions only: the engine recomputes names freely and relies on
//! identical inputs producing identical strings.

use chrono::NaiveDate;

use crate::environment::Environment;
use crate::error::NamingError;
use crate::types::{ActionKind, BranchPlan};

/// Body text placed on every propagation PR, after the action label.
const PR_BODY_SUFFIX: &str = "PR automatically generated by PatchPort";

/// Patch when moving forward in the pipeline, backport when moving back.
pub fn classify(origin: Environment, destination: Environment) -> Result<ActionKind, NamingError> {
    if origin == destination {
        return Err(NamingError::InvalidPair {
            environment: origin.name().to_string(),
        });
    }
    if destination.position() < origin.position() {
        Ok(ActionKind::Backport)
    } else {
        Ok(ActionKind::Patch)
    }
}

/// Pull the human description out of a `<ticket>|<type>|<description>(<meta>)`
/// commit title.
///
/// Titles that do not follow the convention are returned unchanged.
pub fn extract_description(commit_title: &str) -> String {
    let parts: Vec<&str> = commit_title.split('|').collect();
    if parts.len() < 3 {
        return commit_title.to_string();
    }
    parts[2]
        .split('(')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Lowercase kebab-case restricted to `[a-z0-9-]`.
///
/// Every maximal run of other characters becomes one hyphen; leading and
/// trailing hyphens are dropped.
pub fn to_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for ch in text.chars() {
        let lower = ch.to_ascii_lowercase();
        if lower.is_ascii_lowercase() || lower.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(lower);
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// `{kind}/from-{origin}-to-{destination}/{slug}`
pub fn branch_name(
    kind: ActionKind,
    origin: Environment,
    destination: Environment,
    description: &str,
) -> String {
    format!(
        "{}/from-{}-to-{}/{}",
        kind.as_str(),
        origin.name(),
        destination.name(),
        to_slug(description)
    )
}

/// Compose every name a destination needs.
///
/// `commit_title` is carried verbatim (trimmed) into the PR title so the ticket
/// prefix stays visible on the hosting side.
pub fn build_branch_plan(
    origin: Environment,
    destination: Environment,
    kind: ActionKind,
    description: &str,
    commit_title: &str,
) -> BranchPlan {
    let label = kind.label();
    BranchPlan {
        kind,
        origin,
        destination,
        new_branch: branch_name(kind, origin, destination, description),
        base_branch: destination.vcs_branch().to_string(),
        pr_title: format!(
            "{label} | {} to {} | {}",
            origin.display_name(),
            destination.display_name(),
            commit_title.trim()
        ),
        pr_body: format!("{label} {PR_BODY_SUFFIX}"),
        pr_label: label.to_string(),
    }
}

/// `release/{env}/{YYYY-MM-DD}`
pub fn release_branch_name(target: Environment, date: NaiveDate) -> String {
    format!("release/{}/{}", target.name(), date.format("%Y-%m-%d"))
}

/// `"{ENV} Deployment {YYYY-MM-DD}"`
pub fn release_pr_title(target: Environment, date: NaiveDate) -> String {
    format!(
        "{} Deployment {}",
        target.name().to_uppercase(),
        date.format("%Y-%m-%d")
    )
}

/// `"{ENV} Release"`
pub fn release_label(target: Environment) -> String {
    format!("{} Release", target.name().to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_same_environment_is_invalid() {
        let err = classify(Environment::Qa, Environment::Qa).unwrap_err();
        assert!(matches!(err, NamingError::InvalidPair { .. }));
    }

    #[test]
    fn extract_description_conventional_title() {
        assert_eq!(
            extract_description("JIRA-1|feat|Add login (details)"),
            "Add login"
        );
    }

    #[test]
    fn extract_description_fallback_is_verbatim() {
        assert_eq!(extract_description("no pipes here"), "no pipes here");
        assert_eq!(extract_description("one|pipe"), "one|pipe");
    }

    #[test]
    fn extract_description_without_meta() {
        assert_eq!(extract_description("T-2|fix|  Tidy header  "), "Tidy header");
        assert_eq!(extract_description("T-2|fix|(meta only)"), "");
    }

    #[test]
    fn slug_collapses_runs_and_trims() {
        assert_eq!(to_slug("Add login"), "add-login");
        assert_eq!(to_slug("  --Fix: crash!! on   start--"), "fix-crash-on-start");
        assert_eq!(to_slug(""), "");
        assert_eq!(to_slug("!!!"), "");
        assert_eq!(to_slug("Über café 2"), "ber-caf-2");
    }

    #[test]
    fn plan_for_patch() {
        let plan = build_branch_plan(
            Environment::Develop,
            Environment::Qa,
            ActionKind::Patch,
            "Add login",
            "JIRA-1|feat|Add login (details)\n",
        );
        assert_eq!(plan.new_branch, "patch/from-develop-to-qa/add-login");
        assert_eq!(plan.base_branch, "qa");
        assert_eq!(
            plan.pr_title,
            "Patch | Develop to QA | JIRA-1|feat|Add login (details)"
        );
        assert_eq!(plan.pr_body, "Patch PR automatically generated by PatchPort");
        assert_eq!(plan.pr_label, "Patch");
    }

    #[test]
    fn plan_towards_prod_uses_master_as_base() {
        let plan = build_branch_plan(
            Environment::Uat,
            Environment::Prod,
            ActionKind::Patch,
            "Add login",
            "Add login",
        );
        assert_eq!(plan.base_branch, "master");
        assert_eq!(plan.new_branch, "patch/from-uat-to-prod/add-login");
    }

    #[test]
    fn release_names() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).expect("date");
        assert_eq!(
            release_branch_name(Environment::Uat, date),
            "release/uat/2024-03-07"
        );
        assert_eq!(
            release_pr_title(Environment::Prod, date),
            "PROD Deployment 2024-03-07"
        );
        assert_eq!(release_label(Environment::Qa), "QA Release");
    }
}
