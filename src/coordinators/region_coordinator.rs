use std::sync::Arc;

use crate::app_data::AppData;
use crate::coordinators::authorize;
use crate::errors::InternalError;
use crate::types::db::{branch, district, institution, province};
use crate::types::internal::audit::EventType;
use crate::types::internal::context::RequestContext;
use crate::types::internal::permission::Permission;

/// Province, district, branch and institution reference data
///
/// Reads need `REGION_LIST`, every change `REGION_MANAGE`. Region data is
/// not scope filtered.
pub struct RegionCoordinator {
    app_data: Arc<AppData>,
}

impl RegionCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self { app_data }
    }

    async fn audit(&self, ctx: &RequestContext, kind: &str, action: &str, id: &str) {
        self.app_data
            .audit_logger
            .builder(EventType::RegionChanged)
            .with_context(ctx)
            .add_field("kind", kind)
            .add_field("action", action)
            .add_field("region_id", id)
            .emit()
            .await;
    }

    // Provinces

    pub async fn list_provinces(&self, ctx: &RequestContext) -> Result<Vec<province::Model>, InternalError> {
        authorize(&self.app_data, ctx, Permission::RegionList).await?;
        self.app_data
            .region_store
            .list_provinces(&self.app_data.connections.main)
            .await
    }

    pub async fn get_province(&self, ctx: &RequestContext, id: &str) -> Result<province::Model, InternalError> {
        authorize(&self.app_data, ctx, Permission::RegionList).await?;
        self.app_data
            .region_store
            .get_province(&self.app_data.connections.main, id)
            .await
    }

    pub async fn create_province(
        &self,
        ctx: &RequestContext,
        code: String,
        name: String,
    ) -> Result<province::Model, InternalError> {
        authorize(&self.app_data, ctx, Permission::RegionManage).await?;
        let province = self
            .app_data
            .region_store
            .create_province(&self.app_data.connections.main, code.trim().to_string(), name.trim().to_string())
            .await?;
        self.audit(ctx, "province", "create", &province.id).await;
        Ok(province)
    }

    pub async fn update_province(
        &self,
        ctx: &RequestContext,
        id: &str,
        code: Option<String>,
        name: Option<String>,
    ) -> Result<province::Model, InternalError> {
        authorize(&self.app_data, ctx, Permission::RegionManage).await?;
        let province = self
            .app_data
            .region_store
            .update_province(&self.app_data.connections.main, id, code, name)
            .await?;
        self.audit(ctx, "province", "update", id).await;
        Ok(province)
    }

    pub async fn delete_province(&self, ctx: &RequestContext, id: &str) -> Result<(), InternalError> {
        authorize(&self.app_data, ctx, Permission::RegionManage).await?;
        self.app_data
            .region_store
            .delete_province(&self.app_data.connections.main, id)
            .await?;
        self.audit(ctx, "province", "delete", id).await;
        Ok(())
    }

    // Districts

    pub async fn list_districts(
        &self,
        ctx: &RequestContext,
        province_id: Option<&str>,
    ) -> Result<Vec<district::Model>, InternalError> {
        authorize(&self.app_data, ctx, Permission::RegionList).await?;
        self.app_data
            .region_store
            .list_districts(&self.app_data.connections.main, province_id)
            .await
    }

    pub async fn create_district(
        &self,
        ctx: &RequestContext,
        province_id: &str,
        name: String,
    ) -> Result<district::Model, InternalError> {
        authorize(&self.app_data, ctx, Permission::RegionManage).await?;
        let district = self
            .app_data
            .region_store
            .create_district(&self.app_data.connections.main, province_id, name.trim().to_string())
            .await?;
        self.audit(ctx, "district", "create", &district.id).await;
        Ok(district)
    }

    pub async fn update_district(&self, ctx: &RequestContext, id: &str, name: String) -> Result<district::Model, InternalError> {
        authorize(&self.app_data, ctx, Permission::RegionManage).await?;
        let district = self
            .app_data
            .region_store
            .update_district(&self.app_data.connections.main, id, name.trim().to_string())
            .await?;
        self.audit(ctx, "district", "update", id).await;
        Ok(district)
    }

    pub async fn delete_district(&self, ctx: &RequestContext, id: &str) -> Result<(), InternalError> {
        authorize(&self.app_data, ctx, Permission::RegionManage).await?;
        self.app_data
            .region_store
            .delete_district(&self.app_data.connections.main, id)
            .await?;
        self.audit(ctx, "district", "delete", id).await;
        Ok(())
    }

    // Branches

    pub async fn list_branches(
        &self,
        ctx: &RequestContext,
        province_id: Option<&str>,
    ) -> Result<Vec<branch::Model>, InternalError> {
        authorize(&self.app_data, ctx, Permission::RegionList).await?;
        self.app_data
            .region_store
            .list_branches(&self.app_data.connections.main, province_id)
            .await
    }

    pub async fn create_branch(&self, ctx: &RequestContext, province_id: &str, name: String) -> Result<branch::Model, InternalError> {
        authorize(&self.app_data, ctx, Permission::RegionManage).await?;
        let branch = self
            .app_data
            .region_store
            .create_branch(&self.app_data.connections.main, province_id, name.trim().to_string())
            .await?;
        self.audit(ctx, "branch", "create", &branch.id).await;
        Ok(branch)
    }

    pub async fn update_branch(&self, ctx: &RequestContext, id: &str, name: String) -> Result<branch::Model, InternalError> {
        authorize(&self.app_data, ctx, Permission::RegionManage).await?;
        let branch = self
            .app_data
            .region_store
            .update_branch(&self.app_data.connections.main, id, name.trim().to_string())
            .await?;
        self.audit(ctx, "branch", "update", id).await;
        Ok(branch)
    }

    pub async fn delete_branch(&self, ctx: &RequestContext, id: &str) -> Result<(), InternalError> {
        authorize(&self.app_data, ctx, Permission::RegionManage).await?;
        self.app_data
            .region_store
            .delete_branch(&self.app_data.connections.main, id)
            .await?;
        self.audit(ctx, "branch", "delete", id).await;
        Ok(())
    }

    // Institutions

    pub async fn list_institutions(
        &self,
        ctx: &RequestContext,
        district_id: Option<&str>,
    ) -> Result<Vec<institution::Model>, InternalError> {
        authorize(&self.app_data, ctx, Permission::RegionList).await?;
        self.app_data
            .region_store
            .list_institutions(&self.app_data.connections.main, district_id)
            .await
    }

    pub async fn create_institution(
        &self,
        ctx: &RequestContext,
        name: String,
        district_id: Option<&str>,
    ) -> Result<institution::Model, InternalError> {
        authorize(&self.app_data, ctx, Permission::RegionManage).await?;
        let institution = self
            .app_data
            .region_store
            .create_institution(&self.app_data.connections.main, name.trim().to_string(), district_id)
            .await?;
        self.audit(ctx, "institution", "create", &institution.id).await;
        Ok(institution)
    }

    pub async fn update_institution(
        &self,
        ctx: &RequestContext,
        id: &str,
        name: Option<String>,
        district_id: Option<Option<String>>,
    ) -> Result<institution::Model, InternalError> {
        authorize(&self.app_data, ctx, Permission::RegionManage).await?;
        let institution = self
            .app_data
            .region_store
            .update_institution(&self.app_data.connections.main, id, name, district_id)
            .await?;
        self.audit(ctx, "institution", "update", id).await;
        Ok(institution)
    }

    pub async fn delete_institution(&self, ctx: &RequestContext, id: &str) -> Result<(), InternalError> {
        authorize(&self.app_data, ctx, Permission::RegionManage).await?;
        self.app_data
            .region_store
            .delete_institution(&self.app_data.connections.main, id)
            .await?;
        self.audit(ctx, "institution", "delete", id).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::internal::{AccessError, RegionError};
    use crate::test::utils::{context_for, create_test_member, create_test_user_with_roles, setup_test_app_data};
    use crate::types::internal::permission::SystemRole;

    #[tokio::test]
    async fn test_moderator_reads_but_cannot_manage() {
        let app_data = setup_test_app_data().await;
        let moderator = create_test_user_with_roles(&app_data, "mod", &[SystemRole::Moderator]).await;
        let coordinator = RegionCoordinator::new(app_data);
        let ctx = context_for(&moderator);

        assert!(coordinator.list_provinces(&ctx).await.unwrap().is_empty());
        let result = coordinator.create_province(&ctx, "06".to_string(), "Ankara".to_string()).await;
        assert!(matches!(
            result,
            Err(InternalError::Access(AccessError::MissingPermission(Permission::RegionManage)))
        ));
    }

    #[tokio::test]
    async fn test_hierarchy_and_in_use_guard() {
        let app_data = setup_test_app_data().await;
        let admin = create_test_user_with_roles(&app_data, "root", &[SystemRole::Admin]).await;
        let coordinator = RegionCoordinator::new(app_data.clone());
        let ctx = context_for(&admin);

        let ankara = coordinator
            .create_province(&ctx, " 06 ".to_string(), "Ankara".to_string())
            .await
            .unwrap();
        assert_eq!(ankara.code, "06");
        let duplicate = coordinator.create_province(&ctx, "06".to_string(), "Other".to_string()).await;
        assert!(matches!(duplicate, Err(InternalError::Region(RegionError::DuplicateCode(_)))));

        let cankaya = coordinator
            .create_district(&ctx, &ankara.id, "Cankaya".to_string())
            .await
            .unwrap();
        let districts = coordinator.list_districts(&ctx, Some(&ankara.id)).await.unwrap();
        assert_eq!(districts.len(), 1);

        let in_use = coordinator.delete_province(&ctx, &ankara.id).await;
        assert!(matches!(in_use, Err(InternalError::Region(RegionError::InUse(_)))));

        let member = create_test_member(&app_data.connections.main, &ankara.id, Some(&cankaya.id)).await;
        let district_in_use = coordinator.delete_district(&ctx, &cankaya.id).await;
        assert!(matches!(district_in_use, Err(InternalError::Region(RegionError::InUse(_)))));

        app_data
            .member_store
            .delete(&app_data.connections.main, &member.id)
            .await
            .unwrap();
        coordinator.delete_district(&ctx, &cankaya.id).await.unwrap();
        coordinator.delete_province(&ctx, &ankara.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_institution_district_can_be_cleared() {
        let app_data = setup_test_app_data().await;
        let admin = create_test_user_with_roles(&app_data, "root", &[SystemRole::Admin]).await;
        let coordinator = RegionCoordinator::new(app_data);
        let ctx = context_for(&admin);

        let province = coordinator
            .create_province(&ctx, "35".to_string(), "Izmir".to_string())
            .await
            .unwrap();
        let district = coordinator
            .create_district(&ctx, &province.id, "Konak".to_string())
            .await
            .unwrap();
        let school = coordinator
            .create_institution(&ctx, "Konak High School".to_string(), Some(&district.id))
            .await
            .unwrap();
        assert_eq!(school.district_id.as_deref(), Some(district.id.as_str()));

        let moved = coordinator
            .update_institution(&ctx, &school.id, None, Some(None))
            .await
            .unwrap();
        assert!(moved.district_id.is_none());

        let bad = coordinator
            .update_institution(&ctx, &school.id, None, Some(Some("missing".to_string())))
            .await;
        assert!(matches!(bad, Err(InternalError::Region(RegionError::DistrictNotFound(_)))));
    }
}
