//! Fixed CSV headers for each export kind

use super::flatten::{Column, FieldKind::*};
use crate::models::ExportKind;

pub const RULE_COLUMNS: [Column; 21] = [
    Column::new("key", "Key", Text),
    Column::new("repo", "Repo", Text),
    Column::new("name", "Name", Text),
    Column::new("createdAt", "Created At", Text),
    Column::new("htmlDesc", "HTML Description", Text),
    Column::new("mdDesc", "Markdown Description", Text),
    Column::new("severity", "Severity", Text),
    Column::new("status", "Status", Text),
    Column::new("isTemplate", "Is Template", Raw),
    Column::new("tags", "Tags", TextList),
    Column::new("sysTags", "System Tags", TextList),
    Column::new("lang", "Language", Text),
    Column::new("langName", "Language Name", Text),
    Column::new("params", "Params", Json),
    Column::new("type", "Type", Text),
    Column::new("remFnOverloaded", "Remediation Function Overloaded", Raw),
    Column::new("scope", "Scope", Text),
    Column::new("isExternal", "Is External", Raw),
    Column::new("descriptionSections", "Description Sections", Json),
    Column::new("educationPrinciples", "Education Principles", Json),
    Column::new("cweCodes", "CWE Codes", Json),
];

pub const ISSUE_COLUMNS: [Column; 20] = [
    Column::new("key", "Key", Text),
    Column::new("rule", "Rule", Text),
    Column::new("severity", "Severity", Text),
    Column::new("component", "Component", Text),
    Column::new("project", "Project", Text),
    Column::new("line", "Line", Raw),
    Column::new("hash", "Hash", Text),
    Column::new("textRange", "Text Range", Json),
    Column::new("status", "Status", Text),
    Column::new("message", "Message", Text),
    Column::new("effort", "Effort", Text),
    Column::new("debt", "Debt", Text),
    Column::new("author", "Author", Text),
    Column::new("tags", "Tags", TextList),
    Column::new("creationDate", "Creation Date", Text),
    Column::new("updateDate", "Update Date", Text),
    Column::new("type", "Type", Text),
    Column::new("scope", "Scope", Text),
    Column::new("quickFixAvailable", "Quick Fix Available", Raw),
    Column::new("messageFormattings", "Message Formattings", Json),
];

pub const HOTSPOT_COLUMNS: [Column; 17] = [
    Column::new("key", "Key", Text),
    Column::new("component", "Component", Text),
    Column::new("project", "Project", Text),
    Column::new("securityCategory", "Security Category", Text),
    Column::new("vulnerabilityProbability", "Vulnerability Probability", Text),
    Column::new("status", "Status", Text),
    Column::new("resolution", "Resolution", Text),
    Column::new("line", "Line", Raw),
    Column::new("message", "Message", Text),
    Column::new("assignee", "Assignee", Text),
    Column::new("author", "Author", Text),
    Column::new("creationDate", "Creation Date", Text),
    Column::new("updateDate", "Update Date", Text),
    Column::new("textRange", "Text Range", Json),
    Column::new("flows", "Flows", Json),
    Column::new("ruleKey", "Rule Key", Text),
    Column::new("messageFormattings", "Message Formattings", Json),
];

/// Prefix for rule fields merged into a finding
pub const RULE_PREFIX: &str = "rule.";

/// Finding columns followed by the `rule.` enrichment columns
pub const FINDING_COLUMNS: [Column; 37] = [
    Column::new("key", "Key", Text),
    Column::new("projectKey", "Project Key", Text),
    Column::new("branch", "Branch", Text),
    Column::new("path", "Path", Text),
    Column::new("lineNumber", "Line Number", Text),
    Column::new("message", "Message", Text),
    Column::new("status", "Status", Text),
    Column::new("author", "Author", Text),
    Column::new("createdAt", "Creation Date", Text),
    Column::new("updatedAt", "Update Date", Text),
    Column::new("ruleReference", "Rule Reference", Text),
    Column::new("comments", "Comments", Json),
    Column::new("type", "Type", Text),
    Column::new("severity", "Severity", Text),
    Column::new("effort", "Effort", Text),
    Column::new("tags", "Tags", TextList),
    Column::new("securityCategory", "Security Category", Text),
    Column::new("vulnerabilityProbability", "Vulnerability Probability", Text),
    Column::new("rule.key", "Rule Key", Text),
    Column::new("rule.repo", "Rule Repo", Text),
    Column::new("rule.name", "Rule Name", Text),
    Column::new("rule.createdAt", "Rule Created At", Text),
    Column::new("rule.severity", "Rule Severity", Text),
    Column::new("rule.status", "Rule Status", Text),
    Column::new("rule.isTemplate", "Rule Is Template", Raw),
    Column::new("rule.tags", "Rule Tags", TextList),
    Column::new("rule.sysTags", "Rule System Tags", TextList),
    Column::new("rule.lang", "Rule Language", Text),
    Column::new("rule.langName", "Rule Language Name", Text),
    Column::new("rule.params", "Rule Params", Json),
    Column::new("rule.type", "Rule Type", Text),
    Column::new("rule.remFnOverloaded", "Rule Remediation Function Overloaded", Raw),
    Column::new("rule.scope", "Rule Scope", Text),
    Column::new("rule.isExternal", "Rule Is External", Raw),
    Column::new("rule.descriptionSections", "Rule Description Sections", Json),
    Column::new("rule.educationPrinciples", "Rule Education Principles", Json),
    Column::new("rule.cweCodes", "Rule CWE Codes", Json),
];

/// Rule field names carried into findings, without the prefix
pub fn enrichment_fields() -> impl Iterator<Item = &'static str> {
    FINDING_COLUMNS
        .iter()
        .filter_map(|column| column.id.strip_prefix(RULE_PREFIX))
}

/// Header for an export kind
pub fn columns_for(kind: ExportKind) -> &'static [Column] {
    match kind {
        ExportKind::Rules => &RULE_COLUMNS,
        ExportKind::Issues => &ISSUE_COLUMNS,
        ExportKind::Hotspots => &HOTSPOT_COLUMNS,
        ExportKind::Findings => &FINDING_COLUMNS,
    }
}
