use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::access::assignments::{AssignmentType, ClassAssignment};
use crate::access::guardians::GuardianLink;
use crate::access::identity::Role;
use crate::access::policy::{ResourceKind, VisibilityScope};
use crate::access::status::ApprovalStatus;
use crate::modules::activities::model::{
    Activity, ActivityConsent, CreateActivityDto, PaginatedActivitiesResponse, RecordConsentDto,
    UpdateActivityDto,
};
use crate::modules::alerts::model::{Alert, CreateAlertDto, PaginatedAlertsResponse};
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::auth::model::{LoginRequest, LoginResponse, RegisterRequestDto, User};
use crate::modules::divisions::model::{ClassDivision, MyDivisionsResponse};
use crate::modules::homework::model::{
    CreateHomeworkDto, Homework, PaginatedHomeworkResponse, UpdateHomeworkDto,
};
use crate::utils::pagination::{PaginationMeta, PaginationParams};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::register_user,
        crate::modules::auth::controller::login_user,
        crate::modules::divisions::controller::get_my_divisions,
        crate::modules::homework::controller::create_homework,
        crate::modules::homework::controller::get_homework,
        crate::modules::homework::controller::get_homework_by_id,
        crate::modules::homework::controller::update_homework,
        crate::modules::homework::controller::delete_homework,
        crate::modules::activities::controller::create_activity,
        crate::modules::activities::controller::get_activities,
        crate::modules::activities::controller::get_activity,
        crate::modules::activities::controller::update_activity,
        crate::modules::activities::controller::complete_activity,
        crate::modules::activities::controller::delete_activity,
        crate::modules::activities::controller::record_consent,
        crate::modules::alerts::controller::create_alert,
        crate::modules::alerts::controller::get_alerts,
        crate::modules::alerts::controller::get_alert,
        crate::modules::alerts::controller::approve_alert,
        crate::modules::alerts::controller::reject_alert,
        crate::modules::alerts::controller::send_alert,
        crate::modules::alerts::controller::delete_alert,
    ),
    components(schemas(
        ErrorResponse,
        Role,
        ResourceKind,
        VisibilityScope,
        ApprovalStatus,
        AssignmentType,
        ClassAssignment,
        GuardianLink,
        User,
        RegisterRequestDto,
        LoginRequest,
        LoginResponse,
        ClassDivision,
        MyDivisionsResponse,
        Homework,
        CreateHomeworkDto,
        UpdateHomeworkDto,
        PaginatedHomeworkResponse,
        Activity,
        ActivityConsent,
        CreateActivityDto,
        UpdateActivityDto,
        RecordConsentDto,
        PaginatedActivitiesResponse,
        Alert,
        CreateAlertDto,
        PaginatedAlertsResponse,
        PaginationMeta,
        PaginationParams,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration and login"),
        (name = "Divisions", description = "Class divisions in the actor's scope"),
        (name = "Homework", description = "Class-scoped homework"),
        (name = "Activities", description = "Class activities and consent"),
        (name = "Alerts", description = "Moderated alerts and dispatch"),
    ),
    info(
        title = "Schoolgate API",
        description = "School management API with role-scoped visibility",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
