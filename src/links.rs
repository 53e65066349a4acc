//! Deep links into the organization's web client and the maker portal.

/// Solution opened when none is configured (the default solution).
pub const DEFAULT_SOLUTION_ID: &str = "fd140aaf-4df4-11dd-bd17-0019b9312238";

/// Default maker portal.
pub const DEFAULT_MAKER_PORTAL_URL: &str = "https://make.powerapps.com";

/// List view of a table in the organization's web client.
pub fn build_view_url(org_url: &str, logical_name: &str) -> String {
    format!(
        "{}/main.aspx?pagetype=entitylist&etn={}",
        org_url.trim_end_matches('/'),
        logical_name
    )
}

/// Table editor in the maker portal.
///
/// Falls back to the portal home page when the environment id or the
/// logical name is missing. An empty `solution_id` means the default
/// solution.
pub fn build_maker_edit_url(
    maker_url: &str,
    environment_id: Option<&str>,
    solution_id: Option<&str>,
    logical_name: Option<&str>,
) -> String {
    let base = maker_url.trim_end_matches('/');
    let environment_id = environment_id.filter(|s| !s.is_empty());
    let logical_name = logical_name.filter(|s| !s.is_empty());

    let (Some(environment_id), Some(logical_name)) = (environment_id, logical_name) else {
        return format!("{base}/");
    };

    let solution_id = solution_id
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SOLUTION_ID);
    format!("{base}/e/{environment_id}/s/{solution_id}/t/{logical_name}")
}
