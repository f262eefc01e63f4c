use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::access::assignments::ClassAssignment;
use crate::access::guardians::GuardianLink;

/// One class-section-year combination, e.g. "Grade 1 - B, 2025".
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct ClassDivision {
    pub id: Uuid,
    pub level: String,
    pub division_label: String,
    pub academic_year: String,
}

/// The divisions an actor currently has scope over, with the role-specific
/// detail that produced them.
#[derive(Debug, Serialize, ToSchema)]
pub struct MyDivisionsResponse {
    pub divisions: Vec<ClassDivision>,
    /// Present for teachers: the merged legacy/modern assignment set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignments: Option<Vec<ClassAssignment>>,
    /// Present for parents: guardian links with each child's current division.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<GuardianLink>>,
}
