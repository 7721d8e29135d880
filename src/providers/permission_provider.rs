//! Permission catalog and dependency resolution
//!
//! Every permission lists the permissions it needs in order to be usable
//! (viewing a member needs the member list, approving an application needs
//! user creation, ...). The functions here walk that static map.

use std::collections::BTreeSet;

use crate::errors::InternalError;
use crate::types::internal::permission::Permission;

/// Every permission `permission` depends on, directly or transitively
///
/// The permission itself is not part of the result. The walk keeps a visited
/// set, so a cycle in the map would terminate instead of looping.
pub fn get_all_dependencies(permission: Permission) -> BTreeSet<Permission> {
    let mut visited = BTreeSet::new();
    let mut stack: Vec<Permission> = permission.direct_dependencies().to_vec();

    while let Some(next) = stack.pop() {
        if next == permission || !visited.insert(next) {
            continue;
        }
        stack.extend_from_slice(next.direct_dependencies());
    }

    visited
}

/// Union of the dependency closures of `permissions`, minus the inputs
pub fn get_dependencies_for_permissions<'a, I>(permissions: I) -> BTreeSet<Permission>
where
    I: IntoIterator<Item = &'a Permission>,
{
    let requested: BTreeSet<Permission> = permissions.into_iter().copied().collect();

    requested
        .iter()
        .flat_map(|permission| get_all_dependencies(*permission))
        .filter(|dependency| !requested.contains(dependency))
        .collect()
}

/// Inputs plus all of their dependencies
pub fn expand<'a, I>(permissions: I) -> BTreeSet<Permission>
where
    I: IntoIterator<Item = &'a Permission>,
{
    let mut expanded: BTreeSet<Permission> = permissions.into_iter().copied().collect();
    let dependencies = get_dependencies_for_permissions(expanded.iter());
    expanded.extend(dependencies);
    expanded
}

/// Parse permission tags, failing on the first unknown one
pub fn parse_permissions<S: AsRef<str>>(tags: &[S]) -> Result<BTreeSet<Permission>, InternalError> {
    tags.iter()
        .map(|tag| tag.as_ref().trim().parse::<Permission>().map_err(InternalError::from))
        .collect()
}

/// One catalog row: a permission with what it pulls in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub permission: Permission,
    pub description: &'static str,
    pub direct_dependencies: Vec<Permission>,
    pub all_dependencies: Vec<Permission>,
}

/// The whole permission universe with resolved dependencies
pub fn catalog() -> Vec<CatalogEntry> {
    Permission::ALL
        .iter()
        .map(|permission| CatalogEntry {
            permission: *permission,
            description: permission.description(),
            direct_dependencies: permission.direct_dependencies().to_vec(),
            all_dependencies: get_all_dependencies(*permission).into_iter().collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::internal::RoleError;
    use Permission::*;

    #[test]
    fn test_leaf_permission_has_no_dependencies() {
        assert!(get_all_dependencies(MemberList).is_empty());
        assert!(get_all_dependencies(ActivityLogView).is_empty());
    }

    #[test]
    fn test_dependencies_are_transitive() {
        let deps = get_all_dependencies(DuesCreate);
        assert_eq!(deps, BTreeSet::from([DuesList, MemberView, MemberList]));
    }

    #[test]
    fn test_approve_application_pulls_in_user_creation_chain() {
        let deps = get_all_dependencies(PanelUserApplicationApprove);

        for expected in [PanelUserApplicationList, MemberView, MemberList, UserCreate, UserView, UserList, RoleList] {
            assert!(deps.contains(&expected), "missing {}", expected);
        }
        assert!(!deps.contains(&PanelUserApplicationApprove));
    }

    #[test]
    fn test_closure_never_contains_the_permission_itself() {
        for permission in Permission::ALL {
            assert!(!get_all_dependencies(permission).contains(&permission));
        }
    }

    #[test]
    fn test_dependencies_for_set_exclude_inputs() {
        let deps = get_dependencies_for_permissions(&[MemberView, MemberList, RoleCreate]);
        assert_eq!(deps, BTreeSet::from([RoleView, RoleList]));
    }

    #[test]
    fn test_dependencies_for_empty_set() {
        let none: [Permission; 0] = [];
        assert!(get_dependencies_for_permissions(&none).is_empty());
    }

    #[test]
    fn test_expand_is_closed_and_idempotent() {
        let expanded = expand(&[UserAssignRole]);
        assert_eq!(expanded, BTreeSet::from([UserAssignRole, UserView, UserList, RoleList]));
        assert_eq!(expand(expanded.iter()), expanded);

        for permission in Permission::ALL {
            let closed = expand(&[permission]);
            assert!(get_dependencies_for_permissions(closed.iter()).is_empty());
        }
    }

    #[test]
    fn test_parse_permissions_rejects_unknown_tags() {
        let parsed = parse_permissions(&["MEMBER_VIEW", " DUES_LIST "]).unwrap();
        assert_eq!(parsed, BTreeSet::from([MemberView, DuesList]));

        let err = parse_permissions(&["MEMBER_VIEW", "NOPE"]).unwrap_err();
        assert!(matches!(err, InternalError::Role(RoleError::UnknownPermission(tag)) if tag == "NOPE"));
    }

    #[test]
    fn test_catalog_lists_every_permission() {
        let entries = catalog();
        assert_eq!(entries.len(), Permission::ALL.len());

        let member_create = entries.iter().find(|e| e.permission == MemberCreate).unwrap();
        assert_eq!(member_create.direct_dependencies, vec![MemberView, RegionList]);
        assert!(member_create.all_dependencies.contains(&MemberList));
    }
}
