use crate::e2e::helpers;

use helpers::api_client::TestClient;
use helpers::fake_api::FakeApi;
use helpers::{closed_port_url, spawn_proxy, ProxyContext};
use hyper::StatusCode;
use patients_gateway::error::AppError;
use patients_gateway::infrastructure::config::{Config, HealthPolicy};
use patients_gateway::infrastructure::proxy::{wait_for_upstream, UpstreamClient};
use reqwest::Url;
use std::sync::Arc;
use std::time::{Duration, Instant};
use test_context::test_context;

fn quick_policy(retries: u32) -> HealthPolicy {
    HealthPolicy {
        path: "/api/health/".to_string(),
        interval: Duration::from_millis(50),
        timeout: Duration::from_millis(500),
        retries,
    }
}

#[test_context(ProxyContext)]
#[tokio::test]
async fn it_should_answer_liveness_without_the_upstream(ctx: &ProxyContext) {
    let response = ctx.client.get("/health").await.unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.text().trim(), "healthy");
    assert_eq!(ctx.api.hits("GET", "/health"), 0);
    assert_eq!(ctx.api.hits("GET", "/api/health/"), 0);
}

#[tokio::test]
async fn it_should_stay_live_when_upstream_is_down() {
    let config = Config::with_upstream(closed_port_url());
    let client = TestClient::new(&spawn_proxy(Arc::new(config)).await);

    let response = client.get("/health").await.unwrap();
    response.assert_status(StatusCode::OK);

    let response = client.get("/health/ready").await.unwrap();
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body = response.body.as_ref().unwrap();
    assert_eq!(body["status"], "not_ready");
    assert_eq!(body["upstream"], "down");
}

#[test_context(ProxyContext)]
#[tokio::test]
async fn it_should_report_ready_when_upstream_answers(ctx: &ProxyContext) {
    let response = ctx.client.get("/health/ready").await.unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["upstream"], "up");
    assert_eq!(ctx.api.hits("GET", "/api/health/"), 1);

    ctx.api.set_unhealthy(true);
    let response = ctx.client.get("/health/ready").await.unwrap();
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[test_context(ProxyContext)]
#[tokio::test]
async fn it_should_include_request_id_in_health_responses(ctx: &ProxyContext) {
    let response = ctx.client.get("/health").await.unwrap();
    response.assert_header_exists("x-request-id");

    let response = ctx.client.get("/health/ready").await.unwrap();
    response.assert_header_exists("x-request-id");
}

#[test_context(ProxyContext)]
#[tokio::test]
async fn it_should_handle_concurrent_health_checks(ctx: &ProxyContext) {
    let mut futures = Vec::new();
    for _ in 0..10 {
        let client = ctx.client.clone();
        futures.push(async move { client.get("/health").await });
    }

    let results = futures::future::join_all(futures).await;

    for result in results {
        result.unwrap().assert_status(StatusCode::OK);
    }
}

#[tokio::test]
async fn it_should_pass_the_gate_once_upstream_is_healthy() {
    let api = FakeApi::start().await;
    let config = Config::with_upstream(Url::parse(&api.base_url).unwrap());
    let upstream = UpstreamClient::new(&config).unwrap();

    wait_for_upstream(&upstream, &quick_policy(3)).await.unwrap();

    assert_eq!(api.hits("GET", "/api/health/"), 1);
}

#[tokio::test]
async fn it_should_keep_polling_until_upstream_recovers() {
    let api = FakeApi::start().await;
    api.set_unhealthy(true);
    let config = Config::with_upstream(Url::parse(&api.base_url).unwrap());
    let upstream = UpstreamClient::new(&config).unwrap();

    let recovering = api.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(120)).await;
        recovering.set_unhealthy(false);
    });

    wait_for_upstream(&upstream, &quick_policy(20)).await.unwrap();

    assert!(api.hits("GET", "/api/health/") >= 2);
}

#[tokio::test]
async fn it_should_give_up_after_the_retry_budget() {
    let config = Config::with_upstream(closed_port_url());
    let upstream = UpstreamClient::new(&config).unwrap();

    let started = Instant::now();
    let err = wait_for_upstream(&upstream, &quick_policy(3)).await.unwrap_err();

    assert!(matches!(err, AppError::UpstreamUnavailable(_)), "{:?}", err);
    // two sleeps between three attempts
    assert!(started.elapsed() >= Duration::from_millis(100));
}
