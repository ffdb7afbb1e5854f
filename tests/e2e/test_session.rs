use crate::e2e::helpers;

use helpers::fake_api::TAKEN_USERNAME;
use helpers::raw_http::spawn_canned_server;
use helpers::{build_client, ApiContext};
use patients_gateway::{
    ClientError, Credentials, FileTokenStore, MemoryTokenStore, TokenPair, TokenStore,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use test_context::test_context;

#[test_context(ApiContext)]
#[tokio::test]
async fn it_should_store_both_tokens_on_login(ctx: &ApiContext) {
    let tokens = ctx
        .client
        .session()
        .login(&ctx.credentials())
        .await
        .unwrap();

    assert_eq!(ctx.store.load().await.unwrap(), Some(tokens.clone()));
    assert_eq!(
        ctx.client.session().access_token().await.unwrap(),
        Some(tokens.access)
    );
    assert_eq!(ctx.api.login_calls(), 1);
}

#[test_context(ApiContext)]
#[tokio::test]
async fn it_should_reject_bad_credentials_without_storing_anything(ctx: &ApiContext) {
    let err = ctx
        .client
        .session()
        .login(&Credentials::new("nurse.joy", "wrong"))
        .await
        .unwrap_err();

    match err {
        ClientError::AuthenticationFailed(reason) => {
            assert!(reason.contains("No active account"), "reason: {}", reason)
        }
        other => panic!("expected AuthenticationFailed, got {:?}", other),
    }
    assert!(!ctx.client.session().is_authenticated().await.unwrap());
}

#[test_context(ApiContext)]
#[tokio::test]
async fn it_should_start_a_session_on_register(ctx: &ApiContext) {
    let tokens = ctx
        .client
        .session()
        .register(&Credentials::new("new.doctor", "s3cret-pass"))
        .await
        .unwrap();

    assert_eq!(ctx.store.load().await.unwrap(), Some(tokens));

    let err = ctx
        .client
        .session()
        .register(&Credentials::new(TAKEN_USERNAME, "s3cret-pass"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::AuthenticationFailed(ref r) if r == "Username already exists"));
}

#[test_context(ApiContext)]
#[tokio::test]
async fn it_should_replace_only_the_access_token_on_refresh(ctx: &ApiContext) {
    let before = ctx
        .client
        .session()
        .login(&ctx.credentials())
        .await
        .unwrap();

    ctx.client.session().refresh().await.unwrap();

    let after = ctx.store.load().await.unwrap().unwrap();
    assert_ne!(after.access, before.access);
    assert_eq!(after.refresh, before.refresh);
    assert_eq!(ctx.api.refresh_calls(), 1);
}

#[test_context(ApiContext)]
#[tokio::test]
async fn it_should_fail_refresh_without_a_network_call_when_logged_out(ctx: &ApiContext) {
    let err = ctx.client.session().refresh().await.unwrap_err();

    assert!(err.is_session_expired());
    assert_eq!(ctx.api.refresh_calls(), 0);
}

#[test_context(ApiContext)]
#[tokio::test]
async fn it_should_keep_tokens_when_the_refresh_token_is_rejected(ctx: &ApiContext) {
    let before = ctx
        .client
        .session()
        .login(&ctx.credentials())
        .await
        .unwrap();
    ctx.api.revoke_refresh_tokens();

    let err = ctx.client.session().refresh().await.unwrap_err();

    assert!(err.is_session_expired());
    assert_eq!(ctx.store.load().await.unwrap(), Some(before));
}

#[tokio::test]
async fn it_should_expire_the_session_when_the_refresh_rejection_is_cut_short() {
    // the body promises 200 bytes and the connection closes after 10
    let base_url = spawn_canned_server(
        b"HTTP/1.1 401 Unauthorized\r\n\
          content-type: application/json\r\n\
          content-length: 200\r\n\
          connection: close\r\n\r\n\
          {\"detail\":",
    )
    .await;
    let tokens = TokenPair {
        access: "access-1".to_string(),
        refresh: "refresh-1".to_string(),
    };
    let store = Arc::new(MemoryTokenStore::with_tokens(tokens.clone()));
    let client = build_client(&base_url, store.clone());

    let err = client.session().refresh().await.unwrap_err();

    assert!(err.is_session_expired(), "{:?}", err);
    assert_eq!(store.load().await.unwrap(), Some(tokens));
}

#[test_context(ApiContext)]
#[tokio::test]
async fn it_should_clear_tokens_on_logout_any_number_of_times(ctx: &ApiContext) {
    ctx.login().await;

    ctx.client.session().logout().await.unwrap();
    ctx.client.session().logout().await.unwrap();

    assert_eq!(ctx.client.session().access_token().await.unwrap(), None);
    assert_eq!(ctx.store.load().await.unwrap(), None);
}

#[test_context(ApiContext)]
#[tokio::test]
async fn it_should_resume_a_session_from_a_token_file(ctx: &ApiContext) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let first = build_client(&ctx.api.base_url, Arc::new(FileTokenStore::new(&path)));
    let tokens = first.session().login(&ctx.credentials()).await.unwrap();
    drop(first);

    // a new process reading the same file is already logged in
    let second = build_client(&ctx.api.base_url, Arc::new(FileTokenStore::new(&path)));
    assert_eq!(
        second.session().access_token().await.unwrap(),
        Some(tokens.access.clone())
    );
    second.doctors().list(None).await.unwrap();
    assert_eq!(ctx.api.login_calls(), 1);

    second.session().logout().await.unwrap();
    assert!(!path.exists());
}

#[test_context(ApiContext)]
#[tokio::test]
async fn it_should_accept_preloaded_tokens(ctx: &ApiContext) {
    let (access, refresh) = ctx.api.issue_tokens();
    ctx.store
        .save(&TokenPair {
            access: access.clone(),
            refresh,
        })
        .await
        .unwrap();

    let doctors = ctx.client.doctors().list(None).await.unwrap();

    assert_eq!(doctors.len(), 2);
    assert_eq!(ctx.api.login_calls(), 0);
    assert_eq!(ctx.api.refresh_calls(), 0);
}
