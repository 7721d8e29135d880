use std::sync::Arc;

use sea_orm::ConnectionTrait;

use crate::app_data::AppData;
use crate::config::{begin_transaction, commit_transaction};
use crate::coordinators::authorize;
use crate::errors::InternalError;
use crate::errors::internal::{MemberError, PanelApplicationError, RoleError, UserError};
use crate::providers::AccessProfile;
use crate::providers::access_provider::check_role_scopes;
use crate::stores::application_store::NewApplication;
use crate::stores::user_store::NewUser;
use crate::types::db::member::MemberStatus;
use crate::types::db::panel_user_application::{self, ApplicationStatus};
use crate::types::db::{member, user};
use crate::types::dto::common::PageRequest;
use crate::types::internal::audit::EventType;
use crate::types::internal::context::RequestContext;
use crate::types::internal::permission::{Permission, SystemRole};
use crate::types::internal::scope::ScopeInput;

#[derive(Debug, Clone)]
pub struct CreateApplicationInput {
    pub member_id: String,
    pub requested_username: String,
    /// Custom role the new panel user will hold
    pub requested_role_id: String,
    pub scopes: Vec<ScopeInput>,
    pub note: Option<String>,
}

/// Result of an approval; the temporary password is only ever returned here
#[derive(Debug, Clone)]
pub struct ApprovalOutcome {
    pub application: panel_user_application::Model,
    pub user: user::Model,
    pub temporary_password: String,
}

/// Workflow that promotes an active member to a panel user
///
/// A PENDING application reserves its username. Approval and rejection are
/// conditional on the row still being PENDING, so one review wins.
pub struct ApplicationCoordinator {
    app_data: Arc<AppData>,
}

impl ApplicationCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self { app_data }
    }

    /// Load the applicant member, failing when it is outside the reviewer's regions
    async fn member_in_scope(
        &self,
        conn: &impl ConnectionTrait,
        profile: &AccessProfile,
        member_id: &str,
    ) -> Result<member::Model, InternalError> {
        let member = self.app_data.member_store.get(conn, member_id).await?;
        profile.ensure_in_scope(&member.province_id, member.district_id.as_deref())?;
        Ok(member)
    }

    pub async fn list(
        &self,
        ctx: &RequestContext,
        status: Option<ApplicationStatus>,
        page: PageRequest,
    ) -> Result<(Vec<panel_user_application::Model>, u64), InternalError> {
        let profile = authorize(&self.app_data, ctx, Permission::PanelUserApplicationList).await?;
        self.app_data
            .application_store
            .list(&self.app_data.connections.main, status, &profile.member_scope(), page)
            .await
    }

    pub async fn get(
        &self,
        ctx: &RequestContext,
        application_id: &str,
    ) -> Result<panel_user_application::Model, InternalError> {
        let profile = authorize(&self.app_data, ctx, Permission::PanelUserApplicationList).await?;
        let db = &self.app_data.connections.main;
        let application = self.app_data.application_store.get(db, application_id).await?;
        self.member_in_scope(db, &profile, &application.member_id).await?;
        Ok(application)
    }

    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: CreateApplicationInput,
    ) -> Result<panel_user_application::Model, InternalError> {
        let profile = authorize(&self.app_data, ctx, Permission::PanelUserApplicationCreate).await?;
        let username = input.requested_username.trim().to_string();
        let txn = begin_transaction(&self.app_data.connections.main).await?;

        let member = self.member_in_scope(&txn, &profile, &input.member_id).await?;
        if member.status != MemberStatus::Active {
            return Err(MemberError::NotActive.into());
        }

        let role = self.app_data.role_store.get(&txn, &input.requested_role_id).await?;
        if !role.is_active {
            return Err(RoleError::RoleInactive(role.id).into());
        }

        if self.app_data.user_store.username_exists(&txn, &username).await?
            || self
                .app_data
                .application_store
                .pending_username_exists(&txn, &username)
                .await?
        {
            return Err(UserError::DuplicateUsername { username }.into());
        }
        if self
            .app_data
            .application_store
            .has_pending_for_member(&txn, &member.id)
            .await?
        {
            return Err(PanelApplicationError::PendingExists.into());
        }

        let scopes = self.app_data.region_store.resolve_scopes(&txn, &input.scopes).await?;
        check_role_scopes(std::slice::from_ref(&role), &scopes)?;

        let application = self
            .app_data
            .application_store
            .create(
                &txn,
                NewApplication {
                    member_id: member.id,
                    requested_username: username,
                    requested_role_id: role.id,
                    scopes,
                    note: input.note,
                    created_by: profile.user_id().to_string(),
                },
            )
            .await?;
        commit_transaction(txn).await?;

        self.app_data
            .audit_logger
            .builder(EventType::ApplicationCreated)
            .with_context(ctx)
            .add_field("application_id", &application.id)
            .add_field("member_id", &application.member_id)
            .add_field("requested_username", &application.requested_username)
            .add_field("requested_role_id", &application.requested_role_id)
            .emit()
            .await;

        Ok(application)
    }

    /// Approve and create the panel user in a single transaction
    pub async fn approve(
        &self,
        ctx: &RequestContext,
        application_id: &str,
        review_note: Option<String>,
    ) -> Result<ApprovalOutcome, InternalError> {
        let profile = authorize(&self.app_data, ctx, Permission::PanelUserApplicationApprove).await?;
        let txn = begin_transaction(&self.app_data.connections.main).await?;

        let application = self.app_data.application_store.get(&txn, application_id).await?;
        if application.status != ApplicationStatus::Pending {
            return Err(PanelApplicationError::AlreadyReviewed(application.id).into());
        }
        let member = self.member_in_scope(&txn, &profile, &application.member_id).await?;
        if member.status != MemberStatus::Active {
            return Err(MemberError::NotActive.into());
        }
        let role = self.app_data.role_store.get(&txn, &application.requested_role_id).await?;
        if !role.is_active {
            return Err(RoleError::RoleInactive(role.id).into());
        }

        let reviewed = self
            .app_data
            .application_store
            .mark_reviewed(
                &txn,
                application_id,
                ApplicationStatus::Approved,
                profile.user_id(),
                review_note,
            )
            .await?;
        if !reviewed {
            return Err(PanelApplicationError::AlreadyReviewed(application.id).into());
        }

        let temporary_password = self.app_data.crypto_provider.generate_secure_password();
        let user = self
            .app_data
            .user_store
            .create(
                &txn,
                NewUser {
                    username: application.requested_username.clone(),
                    password_hash: self.app_data.crypto_provider.hash_password(&temporary_password)?,
                    full_name: member.full_name(),
                    email: member.email.clone(),
                    roles: vec![SystemRole::PanelUser],
                    member_id: Some(member.id.clone()),
                    password_change_required: true,
                },
            )
            .await?;
        self.app_data.role_store.assign_role(&txn, &user.id, &role.id).await?;
        self.app_data
            .scope_store
            .replace_for_user(&txn, &user.id, &application.scope_refs()?)
            .await?;
        let application = self
            .app_data
            .application_store
            .set_created_user(&txn, application_id, &user.id)
            .await?;
        commit_transaction(txn).await?;

        tracing::info!(
            application_id = %application.id,
            user_id = %user.id,
            "Panel user application approved"
        );
        self.app_data
            .audit_logger
            .builder(EventType::ApplicationApproved)
            .with_context(ctx)
            .add_field("application_id", &application.id)
            .add_field("member_id", &application.member_id)
            .add_field("created_user_id", &user.id)
            .add_field("role_id", &role.id)
            .emit()
            .await;

        Ok(ApprovalOutcome {
            application,
            user,
            temporary_password,
        })
    }

    pub async fn reject(
        &self,
        ctx: &RequestContext,
        application_id: &str,
        review_note: Option<String>,
    ) -> Result<panel_user_application::Model, InternalError> {
        let profile = authorize(&self.app_data, ctx, Permission::PanelUserApplicationReject).await?;
        let note = review_note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or(PanelApplicationError::NoteRequired)?;
        let db = &self.app_data.connections.main;

        let application = self.app_data.application_store.get(db, application_id).await?;
        self.member_in_scope(db, &profile, &application.member_id).await?;
        let reviewed = self
            .app_data
            .application_store
            .mark_reviewed(
                db,
                application_id,
                ApplicationStatus::Rejected,
                profile.user_id(),
                Some(note),
            )
            .await?;
        if !reviewed {
            return Err(PanelApplicationError::AlreadyReviewed(application.id).into());
        }

        self.app_data
            .audit_logger
            .builder(EventType::ApplicationRejected)
            .with_context(ctx)
            .add_field("application_id", &application.id)
            .add_field("member_id", &application.member_id)
            .emit()
            .await;

        self.app_data.application_store.get(db, application_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::internal::{AccessError, CredentialError};
    use crate::providers::permission_provider;
    use crate::stores::role_store::NewRole;
    use crate::types::db::custom_role;
    use crate::types::internal::scope::{ScopeLevel, ScopeRef};
    use crate::test::utils::{context_for, create_test_member, create_test_province, create_test_user_with_roles, setup_test_app_data};
    use std::collections::BTreeSet;

    struct Fixture {
        app_data: Arc<AppData>,
        admin: user::Model,
        member_id: String,
        province_id: String,
        role: custom_role::Model,
    }

    async fn fixture(scope_level: Option<ScopeLevel>) -> Fixture {
        let app_data = setup_test_app_data().await;
        let db = &app_data.connections.main;
        let admin = create_test_user_with_roles(&app_data, "root", &[SystemRole::Admin]).await;
        let province = create_test_province(db, "06").await;
        let member = create_test_member(db, &province.id, None).await;
        let permissions: BTreeSet<Permission> = [Permission::MemberList].into_iter().collect();
        let role = app_data
            .role_store
            .create(
                db,
                NewRole {
                    name: "Clerk".to_string(),
                    description: None,
                    permissions,
                    scope_level,
                },
            )
            .await
            .unwrap();
        Fixture {
            app_data,
            admin,
            member_id: member.id,
            province_id: province.id,
            role,
        }
    }

    fn input(f: &Fixture, username: &str) -> CreateApplicationInput {
        CreateApplicationInput {
            member_id: f.member_id.clone(),
            requested_username: username.to_string(),
            requested_role_id: f.role.id.clone(),
            scopes: vec![ScopeInput {
                province_id: Some(f.province_id.clone()),
                district_id: None,
            }],
            note: None,
        }
    }

    #[tokio::test]
    async fn test_approve_creates_panel_user_once() {
        let f = fixture(Some(ScopeLevel::Province)).await;
        let coordinator = ApplicationCoordinator::new(f.app_data.clone());
        let ctx = context_for(&f.admin);

        let application = coordinator.create(&ctx, input(&f, "clerk.ankara")).await.unwrap();
        assert_eq!(application.status, ApplicationStatus::Pending);

        let outcome = coordinator.approve(&ctx, &application.id, None).await.unwrap();
        assert_eq!(outcome.application.status, ApplicationStatus::Approved);
        assert_eq!(outcome.application.created_user_id.as_deref(), Some(outcome.user.id.as_str()));
        assert_eq!(outcome.application.reviewed_by.as_deref(), Some(f.admin.id.as_str()));
        assert_eq!(outcome.temporary_password.len(), 20);
        assert!(outcome.user.password_change_required);
        assert_eq!(outcome.user.member_id.as_deref(), Some(f.member_id.as_str()));
        assert!(outcome.user.has_role(SystemRole::PanelUser));

        let db = &f.app_data.connections.main;
        let roles = f.app_data.role_store.roles_for_user(db, &outcome.user.id).await.unwrap();
        assert_eq!(roles[0].id, f.role.id);
        let scopes = f.app_data.scope_store.scopes_for_user(db, &outcome.user.id).await.unwrap();
        assert_eq!(scopes.len(), 1);
        assert!(
            f.app_data
                .crypto_provider
                .verify_password(&outcome.temporary_password, &outcome.user.password_hash)
                .unwrap()
        );

        let again = coordinator.approve(&ctx, &application.id, None).await;
        assert!(matches!(
            again,
            Err(InternalError::Application(PanelApplicationError::AlreadyReviewed(_)))
        ));
        let reject = coordinator.reject(&ctx, &application.id, Some("late".to_string())).await;
        assert!(matches!(
            reject,
            Err(InternalError::Application(PanelApplicationError::AlreadyReviewed(_)))
        ));
    }

    #[tokio::test]
    async fn test_second_pending_application_rejected() {
        let f = fixture(None).await;
        let coordinator = ApplicationCoordinator::new(f.app_data.clone());
        let ctx = context_for(&f.admin);

        coordinator.create(&ctx, input(&f, "first")).await.unwrap();
        let result = coordinator.create(&ctx, input(&f, "second")).await;
        assert!(matches!(
            result,
            Err(InternalError::Application(PanelApplicationError::PendingExists))
        ));
    }

    #[tokio::test]
    async fn test_username_must_be_free() {
        let f = fixture(None).await;
        let coordinator = ApplicationCoordinator::new(f.app_data.clone());

        let result = coordinator.create(&context_for(&f.admin), input(&f, "root")).await;
        assert!(matches!(result, Err(InternalError::User(UserError::DuplicateUsername { .. }))));
    }

    #[tokio::test]
    async fn test_scoped_role_requires_scope() {
        let f = fixture(Some(ScopeLevel::Province)).await;
        let coordinator = ApplicationCoordinator::new(f.app_data.clone());

        let mut without_scope = input(&f, "clerk");
        without_scope.scopes.clear();
        let result = coordinator.create(&context_for(&f.admin), without_scope).await;
        assert!(matches!(result, Err(InternalError::Role(RoleError::ScopeRequired { .. }))));
    }

    #[tokio::test]
    async fn test_member_must_be_active() {
        let f = fixture(None).await;
        let db = &f.app_data.connections.main;
        f.app_data
            .member_store
            .set_status(db, &f.member_id, MemberStatus::Inactive, None)
            .await
            .unwrap();
        let coordinator = ApplicationCoordinator::new(f.app_data.clone());

        let result = coordinator.create(&context_for(&f.admin), input(&f, "clerk")).await;
        assert!(matches!(result, Err(InternalError::Member(MemberError::NotActive))));
    }

    #[tokio::test]
    async fn test_reject_requires_note_and_frees_username() {
        let f = fixture(None).await;
        let coordinator = ApplicationCoordinator::new(f.app_data.clone());
        let ctx = context_for(&f.admin);

        let application = coordinator.create(&ctx, input(&f, "clerk")).await.unwrap();
        let missing = coordinator.reject(&ctx, &application.id, None).await;
        assert!(matches!(
            missing,
            Err(InternalError::Application(PanelApplicationError::NoteRequired))
        ));

        let rejected = coordinator
            .reject(&ctx, &application.id, Some("not eligible".to_string()))
            .await
            .unwrap();
        assert_eq!(rejected.status, ApplicationStatus::Rejected);
        assert_eq!(rejected.review_note.as_deref(), Some("not eligible"));

        coordinator.create(&ctx, input(&f, "clerk")).await.unwrap();
    }

    #[tokio::test]
    async fn test_approved_user_must_change_password() {
        let f = fixture(None).await;
        let coordinator = ApplicationCoordinator::new(f.app_data.clone());
        let ctx = context_for(&f.admin);
        let application = coordinator.create(&ctx, input(&f, "clerk")).await.unwrap();
        let outcome = coordinator.approve(&ctx, &application.id, None).await.unwrap();

        let auth = crate::coordinators::AuthCoordinator::new(f.app_data.clone());
        let tokens = auth
            .login(&RequestContext::new(), "clerk", &outcome.temporary_password)
            .await
            .unwrap();
        assert!(tokens.password_change_required);

        let wrong = auth.login(&RequestContext::new(), "clerk", "nope").await;
        assert!(matches!(wrong, Err(InternalError::Credential(CredentialError::InvalidCredentials))));
    }

    #[tokio::test]
    async fn test_reviewer_limited_to_own_regions() {
        let f = fixture(None).await;
        let db = &f.app_data.connections.main;
        let coordinator = ApplicationCoordinator::new(f.app_data.clone());
        let application = coordinator.create(&context_for(&f.admin), input(&f, "clerk")).await.unwrap();

        let izmir = create_test_province(db, "35").await;
        let reviewer_role = f
            .app_data
            .role_store
            .create(
                db,
                NewRole {
                    name: "Izmir reviewer".to_string(),
                    description: None,
                    permissions: permission_provider::expand(
                        [
                            Permission::PanelUserApplicationApprove,
                            Permission::PanelUserApplicationReject,
                        ]
                        .iter(),
                    ),
                    scope_level: Some(ScopeLevel::Province),
                },
            )
            .await
            .unwrap();
        let reviewer = create_test_user_with_roles(&f.app_data, "reviewer", &[SystemRole::PanelUser]).await;
        f.app_data.role_store.assign_role(db, &reviewer.id, &reviewer_role.id).await.unwrap();
        f.app_data
            .scope_store
            .replace_for_user(
                db,
                &reviewer.id,
                &[ScopeRef {
                    province_id: izmir.id.clone(),
                    district_id: None,
                }],
            )
            .await
            .unwrap();
        let ctx = context_for(&reviewer);

        let (visible, total) = coordinator.list(&ctx, None, PageRequest::default()).await.unwrap();
        assert_eq!(total, 0);
        assert!(visible.is_empty());

        let get = coordinator.get(&ctx, &application.id).await;
        assert!(matches!(get, Err(InternalError::Access(AccessError::OutOfScope))));
        let reject = coordinator.reject(&ctx, &application.id, Some("no".to_string())).await;
        assert!(matches!(reject, Err(InternalError::Access(AccessError::OutOfScope))));
        let approve = coordinator.approve(&ctx, &application.id, None).await;
        assert!(matches!(approve, Err(InternalError::Access(AccessError::OutOfScope))));

        let untouched = coordinator.get(&context_for(&f.admin), &application.id).await.unwrap();
        assert_eq!(untouched.status, ApplicationStatus::Pending);
    }

    #[tokio::test]
    async fn test_approve_requires_member_still_active() {
        let f = fixture(None).await;
        let db = &f.app_data.connections.main;
        let coordinator = ApplicationCoordinator::new(f.app_data.clone());
        let ctx = context_for(&f.admin);
        let application = coordinator.create(&ctx, input(&f, "clerk")).await.unwrap();

        f.app_data
            .member_store
            .set_status(db, &f.member_id, MemberStatus::Expelled, Some("misconduct".to_string()))
            .await
            .unwrap();

        let result = coordinator.approve(&ctx, &application.id, None).await;
        assert!(matches!(result, Err(InternalError::Member(MemberError::NotActive))));

        let still_pending = coordinator.get(&ctx, &application.id).await.unwrap();
        assert_eq!(still_pending.status, ApplicationStatus::Pending);
        assert!(!f.app_data.user_store.username_exists(db, "clerk").await.unwrap());
    }
}
