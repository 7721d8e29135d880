use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::internal::RoleError;

/// Permission tags gating access to API operations
///
/// This is the complete permission universe. Custom roles may only hold
/// values from this enum, and every permission declares the permissions it
/// needs to be usable (see [`Permission::direct_dependencies`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    MemberList,
    MemberView,
    MemberCreate,
    MemberUpdate,
    MemberDelete,
    MemberApprove,
    MemberStatusChange,
    UserList,
    UserView,
    UserCreate,
    UserUpdate,
    UserDeactivate,
    UserAssignRole,
    UserManageScope,
    RoleList,
    RoleView,
    RoleCreate,
    RoleUpdate,
    RoleDelete,
    DuesList,
    DuesCreate,
    DuesUpdate,
    DuesDelete,
    RegionList,
    RegionManage,
    SystemSettingsView,
    SystemSettingsManage,
    FileList,
    FileUpload,
    FileDelete,
    ActivityLogView,
    PanelUserApplicationList,
    PanelUserApplicationCreate,
    PanelUserApplicationApprove,
    PanelUserApplicationReject,
}

impl Permission {
    pub const ALL: [Permission; 35] = [
        Permission::MemberList,
        Permission::MemberView,
        Permission::MemberCreate,
        Permission::MemberUpdate,
        Permission::MemberDelete,
        Permission::MemberApprove,
        Permission::MemberStatusChange,
        Permission::UserList,
        Permission::UserView,
        Permission::UserCreate,
        Permission::UserUpdate,
        Permission::UserDeactivate,
        Permission::UserAssignRole,
        Permission::UserManageScope,
        Permission::RoleList,
        Permission::RoleView,
        Permission::RoleCreate,
        Permission::RoleUpdate,
        Permission::RoleDelete,
        Permission::DuesList,
        Permission::DuesCreate,
        Permission::DuesUpdate,
        Permission::DuesDelete,
        Permission::RegionList,
        Permission::RegionManage,
        Permission::SystemSettingsView,
        Permission::SystemSettingsManage,
        Permission::FileList,
        Permission::FileUpload,
        Permission::FileDelete,
        Permission::ActivityLogView,
        Permission::PanelUserApplicationList,
        Permission::PanelUserApplicationCreate,
        Permission::PanelUserApplicationApprove,
        Permission::PanelUserApplicationReject,
    ];

    /// String tag used in the database, JWT-adjacent payloads and the API
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MemberList => "MEMBER_LIST",
            Self::MemberView => "MEMBER_VIEW",
            Self::MemberCreate => "MEMBER_CREATE",
            Self::MemberUpdate => "MEMBER_UPDATE",
            Self::MemberDelete => "MEMBER_DELETE",
            Self::MemberApprove => "MEMBER_APPROVE",
            Self::MemberStatusChange => "MEMBER_STATUS_CHANGE",
            Self::UserList => "USER_LIST",
            Self::UserView => "USER_VIEW",
            Self::UserCreate => "USER_CREATE",
            Self::UserUpdate => "USER_UPDATE",
            Self::UserDeactivate => "USER_DEACTIVATE",
            Self::UserAssignRole => "USER_ASSIGN_ROLE",
            Self::UserManageScope => "USER_MANAGE_SCOPE",
            Self::RoleList => "ROLE_LIST",
            Self::RoleView => "ROLE_VIEW",
            Self::RoleCreate => "ROLE_CREATE",
            Self::RoleUpdate => "ROLE_UPDATE",
            Self::RoleDelete => "ROLE_DELETE",
            Self::DuesList => "DUES_LIST",
            Self::DuesCreate => "DUES_CREATE",
            Self::DuesUpdate => "DUES_UPDATE",
            Self::DuesDelete => "DUES_DELETE",
            Self::RegionList => "REGION_LIST",
            Self::RegionManage => "REGION_MANAGE",
            Self::SystemSettingsView => "SYSTEM_SETTINGS_VIEW",
            Self::SystemSettingsManage => "SYSTEM_SETTINGS_MANAGE",
            Self::FileList => "FILE_LIST",
            Self::FileUpload => "FILE_UPLOAD",
            Self::FileDelete => "FILE_DELETE",
            Self::ActivityLogView => "ACTIVITY_LOG_VIEW",
            Self::PanelUserApplicationList => "PANEL_USER_APPLICATION_LIST",
            Self::PanelUserApplicationCreate => "PANEL_USER_APPLICATION_CREATE",
            Self::PanelUserApplicationApprove => "PANEL_USER_APPLICATION_APPROVE",
            Self::PanelUserApplicationReject => "PANEL_USER_APPLICATION_REJECT",
        }
    }

    /// Permissions that must also be held for this one to be usable
    ///
    /// This is the static adjacency map walked by the dependency resolver.
    /// It must stay acyclic.
    pub fn direct_dependencies(&self) -> &'static [Permission] {
        use Permission::*;
        match self {
            MemberView => &[MemberList],
            MemberCreate | MemberUpdate => &[MemberView, RegionList],
            MemberDelete | MemberApprove | MemberStatusChange => &[MemberView],
            UserView => &[UserList],
            UserCreate => &[UserView, RoleList],
            UserUpdate | UserDeactivate => &[UserView],
            UserAssignRole => &[UserView, RoleList],
            UserManageScope => &[UserView, RegionList],
            RoleView => &[RoleList],
            RoleCreate | RoleUpdate | RoleDelete => &[RoleView],
            DuesList => &[MemberView],
            DuesCreate | DuesUpdate | DuesDelete => &[DuesList],
            RegionManage => &[RegionList],
            SystemSettingsManage => &[SystemSettingsView],
            FileUpload | FileDelete => &[FileList],
            PanelUserApplicationList => &[MemberView],
            PanelUserApplicationCreate => &[PanelUserApplicationList, RoleList, RegionList],
            PanelUserApplicationApprove => &[PanelUserApplicationList, UserCreate],
            PanelUserApplicationReject => &[PanelUserApplicationList],
            MemberList | UserList | RoleList | RegionList | SystemSettingsView | FileList
            | ActivityLogView => &[],
        }
    }

    /// Human readable description for the permission catalog
    pub fn description(&self) -> &'static str {
        use Permission::*;
        match self {
            MemberList => "List members",
            MemberView => "View member details",
            MemberCreate => "Register new members",
            MemberUpdate => "Edit member records",
            MemberDelete => "Delete pending or rejected members",
            MemberApprove => "Approve or reject membership requests",
            MemberStatusChange => "Change membership status",
            UserList => "List panel users",
            UserView => "View panel user details",
            UserCreate => "Create panel users",
            UserUpdate => "Edit panel users",
            UserDeactivate => "Deactivate panel users",
            UserAssignRole => "Assign custom roles to users",
            UserManageScope => "Manage the regions a user is responsible for",
            RoleList => "List roles",
            RoleView => "View role details",
            RoleCreate => "Create custom roles",
            RoleUpdate => "Edit custom roles",
            RoleDelete => "Delete custom roles",
            DuesList => "List dues payments",
            DuesCreate => "Record dues payments",
            DuesUpdate => "Edit dues payments",
            DuesDelete => "Delete dues payments",
            RegionList => "List provinces, districts, branches and institutions",
            RegionManage => "Manage provinces, districts, branches and institutions",
            SystemSettingsView => "View system settings",
            SystemSettingsManage => "Change system settings",
            FileList => "List uploaded files",
            FileUpload => "Upload files",
            FileDelete => "Delete uploaded files",
            ActivityLogView => "View the activity log",
            PanelUserApplicationList => "List panel user applications",
            PanelUserApplicationCreate => "Apply for a member to become a panel user",
            PanelUserApplicationApprove => "Approve panel user applications",
            PanelUserApplicationReject => "Reject panel user applications",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| RoleError::UnknownPermission(s.to_string()))
    }
}

/// Built-in system roles carried on every user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, poem_openapi::Enum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[oai(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemRole {
    /// Holds every permission and is never scope restricted
    Admin,
    /// Read-mostly back office staff
    Moderator,
    /// Promoted member, permissions come from custom roles
    PanelUser,
    /// Plain member account
    Member,
}

impl SystemRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Moderator => "MODERATOR",
            Self::PanelUser => "PANEL_USER",
            Self::Member => "MEMBER",
        }
    }

    /// Permissions granted by the role itself, before custom roles
    pub fn default_permissions(&self) -> &'static [Permission] {
        use Permission::*;
        match self {
            Self::Admin => &Permission::ALL,
            Self::Moderator => &[
                MemberList,
                MemberView,
                DuesList,
                RegionList,
                RoleList,
                UserList,
                UserView,
                FileList,
                SystemSettingsView,
                PanelUserApplicationList,
            ],
            Self::PanelUser | Self::Member => &[],
        }
    }
}

impl fmt::Display for SystemRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_all_contains_every_permission_once() {
        let unique: HashSet<_> = Permission::ALL.iter().collect();
        assert_eq!(unique.len(), Permission::ALL.len());
    }

    #[test]
    fn test_string_tags_round_trip() {
        for permission in Permission::ALL {
            let parsed: Permission = permission.as_str().parse().unwrap();
            assert_eq!(parsed, permission);
        }
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let result = "MEMBER_TELEPORT".parse::<Permission>();
        assert!(matches!(result, Err(RoleError::UnknownPermission(tag)) if tag == "MEMBER_TELEPORT"));
    }

    #[test]
    fn test_serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&Permission::PanelUserApplicationApprove).unwrap();
        assert_eq!(json, "\"PANEL_USER_APPLICATION_APPROVE\"");

        let role: SystemRole = serde_json::from_str("\"PANEL_USER\"").unwrap();
        assert_eq!(role, SystemRole::PanelUser);
    }

    #[test]
    fn test_no_permission_depends_on_itself() {
        for permission in Permission::ALL {
            assert!(!permission.direct_dependencies().contains(&permission));
        }
    }

    #[test]
    fn test_admin_defaults_cover_universe() {
        assert_eq!(SystemRole::Admin.default_permissions().len(), Permission::ALL.len());
        assert!(SystemRole::PanelUser.default_permissions().is_empty());
    }
}
