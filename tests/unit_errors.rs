use axum::http::StatusCode;

use schoolgate::access::policy::{DenyReason, Decision};
use schoolgate::access::store::StoreError;
use schoolgate::utils::errors::{AppError, ensure_allowed};

#[test]
fn allowed_decision_passes_through() {
    assert!(ensure_allowed(&Decision::allow()).is_ok());
}

#[test]
fn denials_collapse_to_forbidden() {
    for reason in [DenyReason::Role, DenyReason::Scope, DenyReason::Ownership] {
        let err = ensure_allowed(&Decision::deny(reason)).unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.error.to_string(), "Access denied");
    }
}

#[test]
fn state_denial_maps_to_conflict() {
    let err = ensure_allowed(&Decision::deny(DenyReason::State)).unwrap_err();
    assert_eq!(err.status, StatusCode::CONFLICT);
}

#[test]
fn store_conflict_surfaces_as_409() {
    let err = AppError::from(StoreError::Conflict(
        "student already has a primary guardian".into(),
    ));
    assert_eq!(err.status, StatusCode::CONFLICT);
    assert_eq!(
        err.error.to_string(),
        "student already has a primary guardian"
    );
}

#[test]
fn store_not_found_surfaces_as_404() {
    let err = AppError::from(StoreError::NotFound);
    assert_eq!(err.status, StatusCode::NOT_FOUND);
}

#[test]
fn store_unavailable_surfaces_as_500() {
    let err = AppError::from(StoreError::Unavailable(anyhow::anyhow!("pool exhausted")));
    assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
}
