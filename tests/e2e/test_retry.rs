use crate::e2e::helpers;

use helpers::ApiContext;
use patients_gateway::{ApiRequest, ClientError, TokenStore};
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use std::time::Duration;
use test_context::test_context;

const DOCTORS: &str = "/api/doctors/";

#[test_context(ApiContext)]
#[tokio::test]
async fn it_should_send_the_request_once_when_the_token_is_valid(ctx: &ApiContext) {
    ctx.login().await;

    let response = ctx.client.send(&ApiRequest::get(DOCTORS)).await.unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(ctx.api.hits("GET", DOCTORS), 1);
    assert_eq!(ctx.api.refresh_calls(), 0);
}

#[test_context(ApiContext)]
#[tokio::test]
async fn it_should_refresh_and_retry_once_after_a_401(ctx: &ApiContext) {
    let stale = ctx.login().await;
    ctx.api.expire_access_tokens();

    let response = ctx.client.send(&ApiRequest::get(DOCTORS)).await.unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(ctx.api.hits("GET", DOCTORS), 2);
    assert_eq!(ctx.api.refresh_calls(), 1);
    let current = ctx.client.session().access_token().await.unwrap().unwrap();
    assert_ne!(current, stale);
}

#[test_context(ApiContext)]
#[tokio::test]
async fn it_should_return_session_expired_when_refresh_fails(ctx: &ApiContext) {
    ctx.login().await;
    ctx.api.expire_access_tokens();
    ctx.api.revoke_refresh_tokens();

    let err = ctx.client.send(&ApiRequest::get(DOCTORS)).await.unwrap_err();

    assert!(matches!(err, ClientError::SessionExpired));
    // no retry after the failed refresh
    assert_eq!(ctx.api.hits("GET", DOCTORS), 1);
    assert_eq!(ctx.api.refresh_calls(), 1);
}

#[test_context(ApiContext)]
#[tokio::test]
async fn it_should_return_a_second_401_without_retrying_again(ctx: &ApiContext) {
    ctx.login().await;
    ctx.api.reject_everything();

    let response = ctx.client.send(&ApiRequest::get(DOCTORS)).await.unwrap();

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.error_body().is_token_not_valid());
    assert_eq!(ctx.api.hits("GET", DOCTORS), 2);
    assert_eq!(ctx.api.refresh_calls(), 1);

    // the typed layer reports it as a failed request, never as a hidden retry loop
    let err = ctx.client.doctors().list(None).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    assert_eq!(ctx.api.hits("GET", DOCTORS), 4);
}

#[test_context(ApiContext)]
#[tokio::test]
async fn it_should_not_retry_other_error_statuses(ctx: &ApiContext) {
    ctx.login().await;

    let response = ctx
        .client
        .send(&ApiRequest::get("/api/patients/404/"))
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(ctx.api.hits("GET", "/api/patients/404/"), 1);
    assert_eq!(ctx.api.refresh_calls(), 0);
}

#[test_context(ApiContext)]
#[tokio::test]
async fn it_should_replay_the_body_on_retry(ctx: &ApiContext) {
    ctx.login().await;
    ctx.api.expire_access_tokens();

    let request = ApiRequest::post(
        "/api/patients/",
        &serde_json::json!({
            "full_name": "Layla Nasser",
            "age": 34,
            "gender": "female",
            "area": "Old Town",
            "mobile_number": "0599123456"
        }),
    )
    .unwrap();
    let response = ctx.client.send(&request).await.unwrap();

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(ctx.api.hits("POST", "/api/patients/"), 2);

    let patients = ctx.client.patients().list().await.unwrap();
    assert_eq!(patients.len(), 1);
    assert_eq!(patients[0].full_name, "Layla Nasser");
}

#[test_context(ApiContext)]
#[tokio::test]
async fn it_should_coalesce_concurrent_refreshes(ctx: &ApiContext) {
    ctx.login().await;
    ctx.api.expire_access_tokens();
    ctx.api.set_refresh_delay(Duration::from_millis(100));

    let request = ApiRequest::get(DOCTORS);
    let results = futures::future::join_all((0..5).map(|_| ctx.client.send(&request))).await;

    for result in results {
        assert_eq!(result.unwrap().status, StatusCode::OK);
    }
    assert_eq!(ctx.api.refresh_calls(), 1);
    assert_eq!(ctx.api.hits("GET", DOCTORS), 10);
}

#[test_context(ApiContext)]
#[tokio::test]
async fn it_should_send_unauthenticated_requests_before_login(ctx: &ApiContext) {
    let err = ctx.client.send(&ApiRequest::get(DOCTORS)).await.unwrap_err();

    // a 401 with nothing to refresh
    assert!(err.is_session_expired());
    assert_eq!(ctx.api.refresh_calls(), 0);
    assert_eq!(ctx.store.load().await.unwrap(), None);
}
