//! Per-family result of a reconciliation run.

use crate::config::Action;
use crate::models::AddressFamily;
use colored::Colorize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub action: Action,
    pub family: AddressFamily,
    pub list_name: String,
    /// `None` when create had nothing to create, or on a create dry run.
    pub list_id: Option<String>,
    pub added: usize,
    pub removed: usize,
    /// Mutation chunks applied, or planned on a dry run.
    pub chunks: usize,
    /// Capacity the list was (or would be) raised to before the chunks.
    pub resized_to: Option<usize>,
    pub final_version: Option<i64>,
    pub dry_run: bool,
}

impl SyncReport {
    pub fn new(action: Action, family: AddressFamily, list_name: &str) -> Self {
        SyncReport {
            action,
            family,
            list_name: list_name.to_string(),
            list_id: None,
            added: 0,
            removed: 0,
            chunks: 0,
            resized_to: None,
            final_version: None,
            dry_run: false,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.chunks == 0 && self.resized_to.is_none()
    }
}

impl std::fmt::Display for SyncReport {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let tag = if self.dry_run {
            "PLAN".on_blue()
        } else if self.is_noop() {
            "NOOP".normal()
        } else {
            "DONE".on_green()
        };
        write!(
            f,
            "{tag} {action} {name} ({family}) id={id} +{added} -{removed} chunks={chunks}",
            action = self.action,
            name = self.list_name,
            family = self.family,
            id = self.list_id.as_deref().unwrap_or("none"),
            added = self.added,
            removed = self.removed,
            chunks = self.chunks,
        )?;
        if let Some(max_entries) = self.resized_to {
            write!(f, " max-entries={max_entries}")?;
        }
        if let Some(version) = self.final_version {
            write!(f, " version={version}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        colored::control::set_override(false);
        let mut report = SyncReport::new(Action::Update, AddressFamily::V6, "office-ipv6");
        report.list_id = Some("pl-1".to_string());
        report.added = 3;
        report.removed = 1;
        report.chunks = 1;
        report.final_version = Some(4);
        assert_eq!(
            report.to_string(),
            "DONE update office-ipv6 (IPv6) id=pl-1 +3 -1 chunks=1 version=4"
        );
    }

    #[test]
    fn test_display_empty_create() {
        colored::control::set_override(false);
        let report = SyncReport::new(Action::Create, AddressFamily::V4, "office-ipv4");
        assert!(report.is_noop());
        assert_eq!(
            report.to_string(),
            "NOOP create office-ipv4 (IPv4) id=none +0 -0 chunks=0"
        );
    }
}
