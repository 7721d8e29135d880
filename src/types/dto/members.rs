use poem_openapi::Object;
use poem_openapi::types::MaybeUndefined;

use crate::coordinators::member_coordinator::CreateMemberInput;
use crate::stores::member_store::MemberChanges;
use crate::types::db::member::{self, MemberStatus};
use crate::types::dto::common::PageInfo;
use crate::types::dto::into_change;

#[derive(Object, Debug, Clone)]
pub struct MemberResponse {
    pub id: String,
    /// `<year>-<6 digit sequence>`
    pub registration_number: String,
    pub national_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// `YYYY-MM-DD`
    pub birth_date: Option<String>,
    pub province_id: String,
    pub district_id: Option<String>,
    pub branch_id: Option<String>,
    pub institution_id: Option<String>,
    pub status: MemberStatus,
    pub status_reason: Option<String>,
    pub created_by: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<member::Model> for MemberResponse {
    fn from(member: member::Model) -> Self {
        Self {
            id: member.id,
            registration_number: member.registration_number,
            national_id: member.national_id,
            first_name: member.first_name,
            last_name: member.last_name,
            email: member.email,
            phone: member.phone,
            birth_date: member.birth_date,
            province_id: member.province_id,
            district_id: member.district_id,
            branch_id: member.branch_id,
            institution_id: member.institution_id,
            status: member.status,
            status_reason: member.status_reason,
            created_by: member.created_by,
            created_at: member.created_at,
            updated_at: member.updated_at,
        }
    }
}

#[derive(Object, Debug)]
pub struct MemberListResponse {
    pub items: Vec<MemberResponse>,
    pub page: PageInfo,
}

#[derive(Object, Debug)]
pub struct CreateMemberRequest {
    /// 11 digits
    pub national_id: String,
    #[oai(validator(min_length = 1, max_length = 100))]
    pub first_name: String,
    #[oai(validator(min_length = 1, max_length = 100))]
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<String>,
    pub province_id: String,
    pub district_id: Option<String>,
    pub branch_id: Option<String>,
    pub institution_id: Option<String>,
}

impl From<CreateMemberRequest> for CreateMemberInput {
    fn from(request: CreateMemberRequest) -> Self {
        Self {
            national_id: request.national_id,
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            phone: request.phone,
            birth_date: request.birth_date,
            province_id: request.province_id,
            district_id: request.district_id,
            branch_id: request.branch_id,
            institution_id: request.institution_id,
        }
    }
}

/// Fields left out are unchanged, `null` clears an optional field
#[derive(Object, Debug, Default)]
pub struct UpdateMemberRequest {
    pub national_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: MaybeUndefined<String>,
    pub phone: MaybeUndefined<String>,
    pub birth_date: MaybeUndefined<String>,
    pub province_id: Option<String>,
    pub district_id: MaybeUndefined<String>,
    pub branch_id: MaybeUndefined<String>,
    pub institution_id: MaybeUndefined<String>,
}

impl From<UpdateMemberRequest> for MemberChanges {
    fn from(request: UpdateMemberRequest) -> Self {
        Self {
            national_id: request.national_id.map(|id| id.trim().to_string()),
            first_name: request.first_name,
            last_name: request.last_name,
            email: into_change(request.email),
            phone: into_change(request.phone),
            birth_date: into_change(request.birth_date),
            province_id: request.province_id,
            district_id: into_change(request.district_id),
            branch_id: into_change(request.branch_id),
            institution_id: into_change(request.institution_id),
        }
    }
}

#[derive(Object, Debug, Default)]
pub struct RejectMemberRequest {
    pub reason: Option<String>,
}

#[derive(Object, Debug)]
pub struct ChangeMemberStatusRequest {
    pub status: MemberStatus,
    /// Required when moving to REJECTED or EXPELLED
    pub reason: Option<String>,
}
