use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::app_data::AppData;
use crate::config::{begin_transaction, commit_transaction};
use crate::coordinators::authorize;
use crate::errors::InternalError;
use crate::errors::internal::MemberError;
use crate::providers::AccessProfile;
use crate::stores::member_store::{MemberChanges, MemberFilter, NewMember};
use crate::stores::region_store::MemberLocation;
use crate::stores::settings_store::MEMBERSHIP_AUTO_APPROVE;
use crate::types::db::member::{self, MemberStatus};
use crate::types::dto::common::PageRequest;
use crate::types::internal::audit::EventType;
use crate::types::internal::context::RequestContext;
use crate::types::internal::permission::Permission;

#[derive(Debug, Clone)]
pub struct CreateMemberInput {
    pub national_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<String>,
    pub province_id: String,
    pub district_id: Option<String>,
    pub branch_id: Option<String>,
    pub institution_id: Option<String>,
}

/// National ids are exactly 11 ASCII digits
pub fn validate_national_id(national_id: &str) -> Result<(), InternalError> {
    if national_id.len() == 11 && national_id.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(MemberError::InvalidNationalId.into())
    }
}

/// Birth dates are ISO dates that are not in the future
pub fn validate_birth_date(birth_date: &str) -> Result<(), InternalError> {
    let date = NaiveDate::parse_from_str(birth_date, "%Y-%m-%d")
        .map_err(|_| MemberError::InvalidBirthDate(birth_date.to_string()))?;
    if date > Utc::now().date_naive() {
        return Err(MemberError::InvalidBirthDate(birth_date.to_string()).into());
    }
    Ok(())
}

/// Reason text that is present and not just whitespace
fn required_reason(reason: Option<String>) -> Result<String, InternalError> {
    reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .ok_or_else(|| MemberError::ReasonRequired.into())
}

/// Member registry workflows, always limited to the caller's scope
pub struct MemberCoordinator {
    app_data: Arc<AppData>,
}

impl MemberCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self { app_data }
    }

    /// Authorize, load the member and check it is inside the caller's scope
    async fn scoped_member(
        &self,
        ctx: &RequestContext,
        permission: Permission,
        member_id: &str,
    ) -> Result<(AccessProfile, member::Model), InternalError> {
        let profile = authorize(&self.app_data, ctx, permission).await?;
        let member = self
            .app_data
            .member_store
            .get(&self.app_data.connections.main, member_id)
            .await?;
        profile.ensure_in_scope(&member.province_id, member.district_id.as_deref())?;
        Ok((profile, member))
    }

    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: &MemberFilter,
        page: PageRequest,
    ) -> Result<(Vec<member::Model>, u64), InternalError> {
        let profile = authorize(&self.app_data, ctx, Permission::MemberList).await?;
        self.app_data
            .member_store
            .list(&self.app_data.connections.main, filter, &profile.member_scope(), page)
            .await
    }

    pub async fn get(&self, ctx: &RequestContext, member_id: &str) -> Result<member::Model, InternalError> {
        let (_, member) = self.scoped_member(ctx, Permission::MemberView, member_id).await?;
        Ok(member)
    }

    /// Register a member
    ///
    /// The member starts PENDING, or ACTIVE when `membership_auto_approve` is on.
    pub async fn create(&self, ctx: &RequestContext, input: CreateMemberInput) -> Result<member::Model, InternalError> {
        let profile = authorize(&self.app_data, ctx, Permission::MemberCreate).await?;
        let national_id = input.national_id.trim().to_string();
        validate_national_id(&national_id)?;
        if let Some(birth_date) = &input.birth_date {
            validate_birth_date(birth_date)?;
        }
        profile.ensure_in_scope(&input.province_id, input.district_id.as_deref())?;

        let txn = begin_transaction(&self.app_data.connections.main).await?;
        self.app_data
            .region_store
            .validate_member_location(
                &txn,
                MemberLocation {
                    province_id: &input.province_id,
                    district_id: input.district_id.as_deref(),
                    branch_id: input.branch_id.as_deref(),
                    institution_id: input.institution_id.as_deref(),
                },
            )
            .await?;

        let auto_approve = self
            .app_data
            .settings_store
            .get_bool(&txn, MEMBERSHIP_AUTO_APPROVE, false)
            .await?;
        let status = if auto_approve { MemberStatus::Active } else { MemberStatus::Pending };

        let member = self
            .app_data
            .member_store
            .create(
                &txn,
                NewMember {
                    national_id,
                    first_name: input.first_name.trim().to_string(),
                    last_name: input.last_name.trim().to_string(),
                    email: input.email,
                    phone: input.phone,
                    birth_date: input.birth_date,
                    province_id: input.province_id,
                    district_id: input.district_id,
                    branch_id: input.branch_id,
                    institution_id: input.institution_id,
                    status,
                    created_by: profile.user_id().to_string(),
                },
            )
            .await?;
        commit_transaction(txn).await?;

        self.app_data
            .audit_logger
            .builder(EventType::MemberCreated)
            .with_context(ctx)
            .add_field("member_id", &member.id)
            .add_field("registration_number", &member.registration_number)
            .add_field("status", member.status.as_str())
            .emit()
            .await;

        Ok(member)
    }

    /// Edit a member; a moved member must stay valid and inside the caller's scope
    pub async fn update(
        &self,
        ctx: &RequestContext,
        member_id: &str,
        changes: MemberChanges,
    ) -> Result<member::Model, InternalError> {
        let (profile, existing) = self.scoped_member(ctx, Permission::MemberUpdate, member_id).await?;
        if let Some(national_id) = &changes.national_id {
            validate_national_id(national_id)?;
        }
        if let Some(Some(birth_date)) = &changes.birth_date {
            validate_birth_date(birth_date)?;
        }

        let province_id = changes.province_id.clone().unwrap_or_else(|| existing.province_id.clone());
        let district_id = match &changes.district_id {
            Some(district_id) => district_id.clone(),
            // Moving province without naming a district drops the old one
            None if changes.province_id.is_some() => None,
            None => existing.district_id.clone(),
        };
        let branch_id = changes.branch_id.clone().unwrap_or_else(|| existing.branch_id.clone());
        let institution_id = changes
            .institution_id
            .clone()
            .unwrap_or_else(|| existing.institution_id.clone());
        profile.ensure_in_scope(&province_id, district_id.as_deref())?;

        let txn = begin_transaction(&self.app_data.connections.main).await?;
        self.app_data
            .region_store
            .validate_member_location(
                &txn,
                MemberLocation {
                    province_id: &province_id,
                    district_id: district_id.as_deref(),
                    branch_id: branch_id.as_deref(),
                    institution_id: institution_id.as_deref(),
                },
            )
            .await?;
        let changes = MemberChanges {
            district_id: Some(district_id),
            ..changes
        };
        let member = self.app_data.member_store.update(&txn, member_id, changes).await?;
        commit_transaction(txn).await?;

        self.app_data
            .audit_logger
            .builder(EventType::MemberUpdated)
            .with_context(ctx)
            .add_field("member_id", member_id)
            .emit()
            .await;

        Ok(member)
    }

    /// Delete a member that never became a real membership
    pub async fn delete(&self, ctx: &RequestContext, member_id: &str) -> Result<(), InternalError> {
        let (_, member) = self.scoped_member(ctx, Permission::MemberDelete, member_id).await?;
        if !member.status.is_deletable() {
            return Err(MemberError::NotDeletable(member.status).into());
        }

        self.app_data
            .member_store
            .delete(&self.app_data.connections.main, member_id)
            .await?;

        self.app_data
            .audit_logger
            .builder(EventType::MemberDeleted)
            .with_context(ctx)
            .add_field("member_id", member_id)
            .add_field("registration_number", &member.registration_number)
            .emit()
            .await;

        Ok(())
    }

    /// PENDING → ACTIVE
    pub async fn approve(&self, ctx: &RequestContext, member_id: &str) -> Result<member::Model, InternalError> {
        let (_, member) = self.scoped_member(ctx, Permission::MemberApprove, member_id).await?;
        if member.status != MemberStatus::Pending {
            return Err(MemberError::InvalidTransition {
                from: member.status,
                to: MemberStatus::Active,
            }
            .into());
        }
        self.transition(ctx, member, MemberStatus::Active, None).await
    }

    /// PENDING → REJECTED, reason required
    pub async fn reject(
        &self,
        ctx: &RequestContext,
        member_id: &str,
        reason: Option<String>,
    ) -> Result<member::Model, InternalError> {
        let (_, member) = self.scoped_member(ctx, Permission::MemberApprove, member_id).await?;
        let reason = required_reason(reason)?;
        if member.status != MemberStatus::Pending {
            return Err(MemberError::InvalidTransition {
                from: member.status,
                to: MemberStatus::Rejected,
            }
            .into());
        }
        self.transition(ctx, member, MemberStatus::Rejected, Some(reason)).await
    }

    /// Any move allowed by the status transition table
    ///
    /// Rejecting and expelling need a reason.
    pub async fn change_status(
        &self,
        ctx: &RequestContext,
        member_id: &str,
        status: MemberStatus,
        reason: Option<String>,
    ) -> Result<member::Model, InternalError> {
        let (_, member) = self.scoped_member(ctx, Permission::MemberStatusChange, member_id).await?;
        if !member.status.can_transition_to(status) {
            return Err(MemberError::InvalidTransition {
                from: member.status,
                to: status,
            }
            .into());
        }
        let reason = match status {
            MemberStatus::Rejected | MemberStatus::Expelled => Some(required_reason(reason)?),
            _ => reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty()),
        };
        self.transition(ctx, member, status, reason).await
    }

    async fn transition(
        &self,
        ctx: &RequestContext,
        member: member::Model,
        status: MemberStatus,
        reason: Option<String>,
    ) -> Result<member::Model, InternalError> {
        let from = member.status;
        let updated = self
            .app_data
            .member_store
            .set_status(&self.app_data.connections.main, &member.id, status, reason.clone())
            .await?;

        self.app_data
            .audit_logger
            .builder(EventType::MemberStatusChanged)
            .with_context(ctx)
            .add_field("member_id", &member.id)
            .add_field("from", from.as_str())
            .add_field("to", status.as_str())
            .add_field("reason", reason)
            .emit()
            .await;

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::internal::{AccessError, RegionError};
    use crate::stores::role_store::NewRole;
    use crate::test::utils::{context_for, create_test_province, create_test_user_with_roles, setup_test_app_data};
    use crate::types::internal::permission::SystemRole;
    use crate::types::internal::scope::{ScopeLevel, ScopeRef};
    use std::collections::BTreeSet;

    fn input(national_id: &str, province_id: &str) -> CreateMemberInput {
        CreateMemberInput {
            national_id: national_id.to_string(),
            first_name: "Ayse".to_string(),
            last_name: "Yilmaz".to_string(),
            email: None,
            phone: None,
            birth_date: Some("1990-04-23".to_string()),
            province_id: province_id.to_string(),
            district_id: None,
            branch_id: None,
            institution_id: None,
        }
    }

    #[test]
    fn test_national_id_format() {
        assert!(validate_national_id("12345678901").is_ok());
        assert!(validate_national_id("1234567890").is_err());
        assert!(validate_national_id("1234567890a").is_err());
    }

    #[test]
    fn test_birth_date_format() {
        assert!(validate_birth_date("1990-04-23").is_ok());
        assert!(validate_birth_date("23.04.1990").is_err());
        assert!(validate_birth_date("2999-01-01").is_err());
    }

    #[tokio::test]
    async fn test_create_pending_then_approve() {
        let app_data = setup_test_app_data().await;
        let admin = create_test_user_with_roles(&app_data, "root", &[SystemRole::Admin]).await;
        let province = create_test_province(&app_data.connections.main, "06").await;
        let coordinator = MemberCoordinator::new(app_data);
        let ctx = context_for(&admin);

        let member = coordinator.create(&ctx, input("12345678901", &province.id)).await.unwrap();
        assert_eq!(member.status, MemberStatus::Pending);

        let approved = coordinator.approve(&ctx, &member.id).await.unwrap();
        assert_eq!(approved.status, MemberStatus::Active);

        let again = coordinator.approve(&ctx, &member.id).await;
        assert!(matches!(again, Err(InternalError::Member(MemberError::InvalidTransition { .. }))));
    }

    #[tokio::test]
    async fn test_auto_approve_setting() {
        let app_data = setup_test_app_data().await;
        let admin = create_test_user_with_roles(&app_data, "root", &[SystemRole::Admin]).await;
        let province = create_test_province(&app_data.connections.main, "06").await;
        app_data
            .settings_store
            .update_value(&app_data.connections.main, MEMBERSHIP_AUTO_APPROVE, "true")
            .await
            .unwrap();
        let coordinator = MemberCoordinator::new(app_data);

        let member = coordinator
            .create(&context_for(&admin), input("12345678901", &province.id))
            .await
            .unwrap();
        assert_eq!(member.status, MemberStatus::Active);
    }

    #[tokio::test]
    async fn test_reject_requires_reason_and_blocks_delete_of_active() {
        let app_data = setup_test_app_data().await;
        let admin = create_test_user_with_roles(&app_data, "root", &[SystemRole::Admin]).await;
        let province = create_test_province(&app_data.connections.main, "06").await;
        let coordinator = MemberCoordinator::new(app_data);
        let ctx = context_for(&admin);

        let pending = coordinator.create(&ctx, input("12345678901", &province.id)).await.unwrap();
        let missing = coordinator.reject(&ctx, &pending.id, Some("  ".to_string())).await;
        assert!(matches!(missing, Err(InternalError::Member(MemberError::ReasonRequired))));
        let rejected = coordinator
            .reject(&ctx, &pending.id, Some("incomplete documents".to_string()))
            .await
            .unwrap();
        assert_eq!(rejected.status, MemberStatus::Rejected);
        coordinator.delete(&ctx, &pending.id).await.unwrap();

        let active = coordinator.create(&ctx, input("10987654321", &province.id)).await.unwrap();
        coordinator.approve(&ctx, &active.id).await.unwrap();
        let result = coordinator.delete(&ctx, &active.id).await;
        assert!(matches!(result, Err(InternalError::Member(MemberError::NotDeletable(MemberStatus::Active)))));
    }

    #[tokio::test]
    async fn test_status_table_is_enforced() {
        let app_data = setup_test_app_data().await;
        let admin = create_test_user_with_roles(&app_data, "root", &[SystemRole::Admin]).await;
        let province = create_test_province(&app_data.connections.main, "06").await;
        let coordinator = MemberCoordinator::new(app_data);
        let ctx = context_for(&admin);

        let member = coordinator.create(&ctx, input("12345678901", &province.id)).await.unwrap();
        coordinator.approve(&ctx, &member.id).await.unwrap();

        let resigned = coordinator
            .change_status(&ctx, &member.id, MemberStatus::Resigned, None)
            .await
            .unwrap();
        assert_eq!(resigned.status, MemberStatus::Resigned);

        let invalid = coordinator
            .change_status(&ctx, &member.id, MemberStatus::Expelled, Some("x".to_string()))
            .await;
        assert!(matches!(invalid, Err(InternalError::Member(MemberError::InvalidTransition { .. }))));

        coordinator
            .change_status(&ctx, &member.id, MemberStatus::Active, None)
            .await
            .unwrap();
        let no_reason = coordinator
            .change_status(&ctx, &member.id, MemberStatus::Expelled, None)
            .await;
        assert!(matches!(no_reason, Err(InternalError::Member(MemberError::ReasonRequired))));
    }

    #[tokio::test]
    async fn test_invalid_location_rejected() {
        let app_data = setup_test_app_data().await;
        let admin = create_test_user_with_roles(&app_data, "root", &[SystemRole::Admin]).await;
        let coordinator = MemberCoordinator::new(app_data);

        let result = coordinator
            .create(&context_for(&admin), input("12345678901", "nowhere"))
            .await;
        assert!(matches!(result, Err(InternalError::Region(RegionError::ProvinceNotFound(_)))));
    }

    #[tokio::test]
    async fn test_scoped_clerk_only_sees_own_province() {
        let app_data = setup_test_app_data().await;
        let db = &app_data.connections.main;
        let admin = create_test_user_with_roles(&app_data, "root", &[SystemRole::Admin]).await;
        let clerk = create_test_user_with_roles(&app_data, "clerk", &[SystemRole::PanelUser]).await;
        let ankara = create_test_province(db, "06").await;
        let izmir = create_test_province(db, "35").await;

        let permissions: BTreeSet<Permission> = [Permission::MemberList, Permission::MemberView].into_iter().collect();
        let role = app_data
            .role_store
            .create(
                db,
                NewRole {
                    name: "Provincial clerk".to_string(),
                    description: None,
                    permissions,
                    scope_level: Some(ScopeLevel::Province),
                },
            )
            .await
            .unwrap();
        app_data.role_store.assign_role(db, &clerk.id, &role.id).await.unwrap();
        app_data
            .scope_store
            .replace_for_user(
                db,
                &clerk.id,
                &[ScopeRef {
                    province_id: ankara.id.clone(),
                    district_id: None,
                }],
            )
            .await
            .unwrap();

        let coordinator = MemberCoordinator::new(app_data.clone());
        let admin_ctx = context_for(&admin);
        let inside = coordinator.create(&admin_ctx, input("12345678901", &ankara.id)).await.unwrap();
        let outside = coordinator.create(&admin_ctx, input("10987654321", &izmir.id)).await.unwrap();

        let clerk_ctx = context_for(&clerk);
        let (members, total) = coordinator
            .list(&clerk_ctx, &MemberFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(members[0].id, inside.id);

        assert!(coordinator.get(&clerk_ctx, &inside.id).await.is_ok());
        let denied = coordinator.get(&clerk_ctx, &outside.id).await;
        assert!(matches!(denied, Err(InternalError::Access(AccessError::OutOfScope))));
    }

    #[tokio::test]
    async fn test_page_far_past_the_end_is_empty() {
        let app_data = setup_test_app_data().await;
        let admin = create_test_user_with_roles(&app_data, "root", &[SystemRole::Admin]).await;
        let province = create_test_province(&app_data.connections.main, "06").await;
        let coordinator = MemberCoordinator::new(app_data);
        let ctx = context_for(&admin);
        coordinator.create(&ctx, input("12345678901", &province.id)).await.unwrap();

        let (members, total) = coordinator
            .list(&ctx, &MemberFilter::default(), PageRequest::new(Some(u64::MAX), Some(100)))
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert!(members.is_empty());
    }
}
