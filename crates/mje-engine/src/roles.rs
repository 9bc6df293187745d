//! Role derivation
//!
//! Two access-control roles per group: a developer role with the four
//! write permissions and a user role with the single view permission.
//! Creation itself goes through the Maestro client's batch call.

use crate::config::RoleSettings;
use crate::error::ExportError;
use mje_model::{Group, ResourcePermission, Role};

/// Permissions granted to the developer role on a group.
const DEVELOPER_PERMISSIONS: [&str; 4] = [
    "view-build-project-group",
    "add-build-project-group",
    "edit-build-project-group",
    "delete-build-project-group",
];

/// Permissions granted to the user role on a group.
const USER_PERMISSIONS: [&str; 1] = ["view-build-project-group"];

/// Derive the developer and user roles for a group.
///
/// The group must already carry its destination id.
pub fn roles_for_group(group: &Group, settings: &RoleSettings) -> Result<Vec<Role>, ExportError> {
    let group_id = group
        .id
        .ok_or_else(|| ExportError::Config(format!("group '{}' has no id yet", group.name)))?;
    let token = normalize_group_name(&group.name);
    Ok(vec![
        role(&settings.developer_template, &token, group_id, &DEVELOPER_PERMISSIONS),
        role(&settings.user_template, &token, group_id, &USER_PERMISSIONS),
    ])
}

fn role(template: &str, token: &str, group_id: u64, permissions: &[&str]) -> Role {
    Role {
        name: template.replace("{group}", token),
        resource_permissions: permissions
            .iter()
            .map(|&permission| ResourcePermission {
                resource: group_id,
                permission: permission.to_string(),
            })
            .collect(),
    }
}

/// Lower-case the group name and drop interior whitespace.
#[must_use]
pub fn normalize_group_name(name: &str) -> String {
    name.to_lowercase().split_whitespace().collect()
}
