//! End-to-end tests for the calculation endpoint.

use std::collections::HashSet;

use calc_service::http::X_REQUEST_ID;
use calc_service::store::{records, OperationKind};
use reqwest::StatusCode;
use sdk_rust::CalculatorClient;
use serde_json::Value;

mod common;

#[tokio::test]
async fn test_add_records_one_calculation() {
    let service = common::start_service().await;
    let client = CalculatorClient::new(&service.url(""));

    let response = client.add(2.5, 4.5).await.unwrap();
    assert_eq!(response.result, 7.0);

    let rows = records::list(&service.store).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].operation, OperationKind::Add);
    assert_eq!(rows[0].operand1, 2.5);
    assert_eq!(rows[0].operand2, 4.5);
    assert_eq!(rows[0].result, 7.0);

    service.shutdown.trigger();
}

#[tokio::test]
async fn test_non_finite_operands_are_client_errors() {
    let service = common::start_service().await;
    let client = reqwest::Client::builder().no_proxy().build().unwrap();

    for query in ["a=NaN&b=1", "a=inf&b=1", "a=1&b=-inf", "a=one&b=2"] {
        let res = client
            .post(service.url(&format!("/add?{}", query)))
            .send()
            .await
            .expect("service unreachable");
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY, "query {query}");
        let body: Value = res.json().await.unwrap();
        assert!(body["detail"].is_string());
    }

    assert_eq!(records::count(&service.store).await.unwrap(), 0);
    service.shutdown.trigger();
}

#[tokio::test]
async fn test_persistence_failure_is_server_fault() {
    let service = common::start_service().await;
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let pool_size = service.store.pool().size();

    // Break persistence underneath the running service.
    sqlx::query("ALTER TABLE calculations RENAME TO calculations_moved")
        .execute(service.store.pool())
        .await
        .unwrap();

    let res = client
        .post(service.url("/add?a=1&b=2"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["detail"], "Internal server error");

    assert_eq!(service.store.open_sessions(), 0);
    assert!(common::pool_settled(&service.store).await);
    assert!(service.store.pool().size() <= pool_size.max(1) + 1);

    let committed: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM calculations_moved")
        .fetch_one(service.store.pool())
        .await
        .unwrap();
    assert_eq!(committed, 0);

    service.shutdown.trigger();
}

#[tokio::test]
async fn test_concurrent_requests_each_record_once() {
    let service = common::start_service().await;
    let client = reqwest::Client::builder().no_proxy().build().unwrap();

    let concurrency = 10;
    let requests_per_task = 5;

    let mut tasks = Vec::new();
    for task in 0..concurrency {
        let client = client.clone();
        let base = service.url("/add");
        tasks.push(tokio::spawn(async move {
            let mut ids = Vec::new();
            for i in 0..requests_per_task {
                let res = client
                    .post(&base)
                    .query(&[("a", task as f64), ("b", i as f64)])
                    .send()
                    .await
                    .unwrap();
                assert_eq!(res.status(), StatusCode::OK);
                ids.push(res.headers()[X_REQUEST_ID].to_str().unwrap().to_string());
                let body: Value = res.json().await.unwrap();
                assert_eq!(body["result"], (task + i) as f64);
            }
            ids
        }));
    }

    let mut request_ids = HashSet::new();
    for task in tasks {
        request_ids.extend(task.await.unwrap());
    }

    let total = concurrency * requests_per_task;
    assert_eq!(request_ids.len(), total);
    assert_eq!(records::count(&service.store).await.unwrap(), total as i64);
    assert_eq!(service.store.open_sessions(), 0);

    service.shutdown.trigger();
}

#[tokio::test]
async fn test_graceful_shutdown_closes_pool() {
    let service = common::start_service().await;
    let client = CalculatorClient::new(&service.url(""));

    assert_eq!(client.health().await.unwrap().status, "ok");

    service.shutdown.trigger();
    service.handle.await.unwrap().unwrap();

    assert!(service.store.pool().is_closed());
}
