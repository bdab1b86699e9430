use axum::http::HeaderMap;

use havenz_auth_types::error::AuthError;
use havenz_core::tasks::BackgroundTasks;
use havenz_domain::role::RoleCode;
use havenz_testing::auth::MockAuth;

use havenz_dashboard::error::DashboardError;
use havenz_dashboard::infra::identity::JwtTokenVerifier;
use havenz_dashboard::usecase::auth::{ResolveError, ResolveIdentityUseCase};

use crate::helpers::{MockDirectory, MockUserRepo, test_shop, test_user, verifier};

fn resolver(
    users: &MockUserRepo,
    directory: &MockDirectory,
    tasks: &BackgroundTasks,
) -> ResolveIdentityUseCase<JwtTokenVerifier, MockUserRepo, MockDirectory> {
    ResolveIdentityUseCase {
        verifier: verifier(),
        users: users.clone(),
        directory: directory.clone(),
        tasks: tasks.clone(),
    }
}

fn assert_auth_error(result: Result<impl std::fmt::Debug, ResolveError>, expected: AuthError) {
    match result {
        Err(ResolveError::Auth(reason)) => assert_eq!(reason, expected),
        other => panic!("expected {expected:?}, got {other:?}"),
    }
}

// ── Happy path ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_resolve_identity_from_local_record() {
    let shop = test_shop("S1");
    let user = test_user(RoleCode::Adjuster, Some(&shop));
    let users = MockUserRepo::new(vec![user.clone()], &[shop.clone()]);
    let directory = MockDirectory::new();
    let tasks = BackgroundTasks::new();

    let token = MockAuth::token(&user.external_id, true, Some(0));
    let identity = resolver(&users, &directory, &tasks)
        .execute(&MockAuth::bearer_headers(&token))
        .await
        .unwrap();

    assert_eq!(identity.id, user.id);
    assert_eq!(identity.role, RoleCode::Adjuster);
    assert_eq!(identity.shop_id, Some(shop.id));
    assert!(identity.is_active);
}

#[tokio::test]
async fn should_record_last_sign_in_in_background() {
    let user = test_user(RoleCode::SuperAdmin, None);
    let users = MockUserRepo::new(vec![user.clone()], &[]);
    let directory = MockDirectory::new();
    let tasks = BackgroundTasks::new();

    let token = MockAuth::token(&user.external_id, true, None);
    resolver(&users, &directory, &tasks)
        .execute(&MockAuth::bearer_headers(&token))
        .await
        .unwrap();
    tasks.wait_idle().await;

    assert!(users.get(user.id).unwrap().last_sign_in_at.is_some());
    assert!(directory.log.lock().unwrap().verified.is_empty());
}

#[tokio::test]
async fn should_mark_email_verified_on_first_sign_in() {
    let shop = test_shop("S1");
    let mut user = test_user(RoleCode::Bodyman, Some(&shop));
    user.email_verified = false;
    let users = MockUserRepo::new(vec![user.clone()], &[shop]);
    let directory = MockDirectory::new();
    let tasks = BackgroundTasks::new();

    let token = MockAuth::token(&user.external_id, false, None);
    resolver(&users, &directory, &tasks)
        .execute(&MockAuth::bearer_headers(&token))
        .await
        .unwrap();
    tasks.wait_idle().await;

    assert!(users.get(user.id).unwrap().email_verified);
    assert_eq!(
        directory.log.lock().unwrap().verified,
        vec![user.external_id.clone()]
    );
}

#[tokio::test]
async fn should_mark_local_record_verified_when_provider_update_fails() {
    let shop = test_shop("S1");
    let mut user = test_user(RoleCode::Adjuster, Some(&shop));
    user.email_verified = false;
    let users = MockUserRepo::new(vec![user.clone()], &[shop]);
    let directory = MockDirectory::failing_verify();
    let tasks = BackgroundTasks::new();

    let token = MockAuth::token(&user.external_id, false, None);
    resolver(&users, &directory, &tasks)
        .execute(&MockAuth::bearer_headers(&token))
        .await
        .unwrap();
    tasks.wait_idle().await;

    assert!(users.get(user.id).unwrap().email_verified);
    assert!(directory.log.lock().unwrap().verified.is_empty());
}

// ── Rejections ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_missing_credential() {
    let result = resolver(&MockUserRepo::empty(), &MockDirectory::new(), &BackgroundTasks::new())
        .execute(&HeaderMap::new())
        .await;
    assert_auth_error(result, AuthError::NoCredential);
}

#[tokio::test]
async fn should_reject_tampered_credential() {
    let user = test_user(RoleCode::SuperAdmin, None);
    let users = MockUserRepo::new(vec![user.clone()], &[]);
    let mut token = MockAuth::token(&user.external_id, true, None);
    token.push('x');

    let result = resolver(&users, &MockDirectory::new(), &BackgroundTasks::new())
        .execute(&MockAuth::bearer_headers(&token))
        .await;
    assert_auth_error(result, AuthError::InvalidCredential);
}

#[tokio::test]
async fn should_reject_expired_credential() {
    let user = test_user(RoleCode::SuperAdmin, None);
    let users = MockUserRepo::new(vec![user.clone()], &[]);
    let token = MockAuth::token_expiring(&user.external_id, true, None, 1_000);

    let result = resolver(&users, &MockDirectory::new(), &BackgroundTasks::new())
        .execute(&MockAuth::bearer_headers(&token))
        .await;
    assert_auth_error(result, AuthError::CredentialExpired);
}

#[tokio::test]
async fn should_reject_verified_uid_without_local_record() {
    let token = MockAuth::token("ext-unknown", true, None);
    let result = resolver(&MockUserRepo::empty(), &MockDirectory::new(), &BackgroundTasks::new())
        .execute(&MockAuth::bearer_headers(&token))
        .await;
    assert_auth_error(result, AuthError::UserNotFound);
}

#[tokio::test]
async fn should_reject_deactivated_user_with_valid_credential() {
    let shop = test_shop("S1");
    let mut user = test_user(RoleCode::Adjuster, Some(&shop));
    user.is_active = false;
    let users = MockUserRepo::new(vec![user.clone()], &[shop]);
    let directory = MockDirectory::new();
    let tasks = BackgroundTasks::new();

    let token = MockAuth::token(&user.external_id, true, Some(0));
    let result = resolver(&users, &directory, &tasks)
        .execute(&MockAuth::bearer_headers(&token))
        .await;
    assert_auth_error(result, AuthError::UserInactive);

    // No sign-in bookkeeping for a rejected account.
    tasks.wait_idle().await;
    assert!(users.get(user.id).unwrap().last_sign_in_at.is_none());
}

#[tokio::test]
async fn should_check_active_state_before_revocation() {
    let mut user = test_user(RoleCode::Admin, None);
    user.is_active = false;
    user.token_version = 3;
    let users = MockUserRepo::new(vec![user.clone()], &[]);

    let token = MockAuth::token(&user.external_id, true, Some(1));
    let result = resolver(&users, &MockDirectory::new(), &BackgroundTasks::new())
        .execute(&MockAuth::bearer_headers(&token))
        .await;
    assert_auth_error(result, AuthError::UserInactive);
}

#[tokio::test]
async fn should_reject_credential_issued_before_revocation() {
    let mut user = test_user(RoleCode::Admin, None);
    user.token_version = 2;
    let users = MockUserRepo::new(vec![user.clone()], &[]);
    let directory = MockDirectory::new();
    let tasks = BackgroundTasks::new();
    let usecase = resolver(&users, &directory, &tasks);

    let stale = MockAuth::token(&user.external_id, true, Some(1));
    assert_auth_error(
        usecase.execute(&MockAuth::bearer_headers(&stale)).await,
        AuthError::CredentialRevoked,
    );

    let current = MockAuth::token(&user.external_id, true, Some(2));
    assert!(usecase.execute(&MockAuth::bearer_headers(&current)).await.is_ok());
}

#[tokio::test]
async fn should_report_lookup_failure_as_internal() {
    let token = MockAuth::token("ext-any", true, None);
    let result = resolver(&MockUserRepo::failing(), &MockDirectory::new(), &BackgroundTasks::new())
        .execute(&MockAuth::bearer_headers(&token))
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, ResolveError::Internal(_)), "got {err:?}");
    assert!(matches!(DashboardError::from(err), DashboardError::Internal(_)));
}

#[tokio::test]
async fn should_collapse_every_auth_failure_to_unauthorized() {
    for reason in [
        AuthError::NoCredential,
        AuthError::InvalidCredential,
        AuthError::CredentialExpired,
        AuthError::CredentialRevoked,
        AuthError::UserNotFound,
        AuthError::UserInactive,
    ] {
        let err = DashboardError::from(ResolveError::Auth(reason));
        assert!(matches!(err, DashboardError::Unauthorized), "{reason:?}");
    }
}
