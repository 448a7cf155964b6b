//! Renders the updated-packages report posted as a pull request comment.

use indexmap::IndexMap;

use crate::diff::UpdatedPackage;

/// Fixed heading identifying the bot's comment, used to find and replace a
/// previously posted report.
pub const COMMENT_HEADING: &str = "## Updated NPM Package ChangeLog URLs";

/// One row of the pipeline's terminal output, in diff emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReport {
    pub name: String,
    pub current_version: String,
    pub previous_version: Option<String>,
    pub changelog_url: Option<String>,
}

/// Join the diff with the discovered changelog URLs, preserving the diff's
/// emission order.
pub fn build_rows(
    updates: &[UpdatedPackage],
    urls: &IndexMap<String, String>,
) -> Vec<PackageReport> {
    updates
        .iter()
        .map(|update| PackageReport {
            name: update.name.clone(),
            current_version: update.current_version.clone(),
            previous_version: update.previous_version.clone(),
            changelog_url: urls.get(&update.name).cloned(),
        })
        .collect()
}

/// Render the markdown comment body. Rows without a located changelog or
/// release URL link to the package's npmjs page instead.
pub fn render_comment(rows: &[PackageReport]) -> String {
    let mut lines = vec![
        COMMENT_HEADING.to_string(),
        String::new(),
        "| Package | Before | After | ChangeLog URL |".to_string(),
        "| --- | --- | --- | --- |".to_string(),
    ];

    for row in rows {
        let before = row.previous_version.as_deref().unwrap_or("-");
        let url = match &row.changelog_url {
            Some(url) => url.clone(),
            None => format!("https://www.npmjs.com/package/{}", row.name),
        };
        lines.push(format!(
            "| {} | {} | {} | {} |",
            row.name, before, row.current_version, url
        ));
    }

    lines.join("\n")
}
