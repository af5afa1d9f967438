#![allow(missing_docs, clippy::expect_used)]

use rstest::rstest;
use serde_json::json;
use tracing::info;

use verdict_core::{BoundaryError, Body, Outcome, OutcomeTag, ParamStyle, ParamValue};

mod common;
pub use self::common::*;

#[rstest]
#[tokio::test]
async fn test_success_with_typed_body(#[future] app: TestApp) -> anyhow::Result<()> {
    let app = app.await;

    let outcome = app.client.call("getUser")?.with_param("id", 1).await;

    let Outcome::Success(response) = outcome else {
        anyhow::bail!("expected a success, got {outcome:?}");
    };
    assert_eq!(response.status(), 200);
    assert_eq!(response.content_type(), "application/json");
    assert_eq!(
        response.typed::<User>(),
        Some(&User {
            id: 1,
            name: "Alice".to_string()
        })
    );
    Ok(())
}

#[rstest]
#[tokio::test]
async fn test_declared_http_error(#[future] app: TestApp) -> anyhow::Result<()> {
    let app = app.await;

    let outcome = app.client.call("getUser")?.with_param("id", 999).await;

    let Outcome::HttpError(response) = outcome else {
        anyhow::bail!("expected an HTTP error, got {outcome:?}");
    };
    assert_eq!(response.status(), 404);
    assert_eq!(response.content_type(), "application/problem+json");
    let problem = response.json::<Problem>()?;
    assert_eq!(problem.title, "Not Found");
    Ok(())
}

#[rstest]
#[tokio::test]
async fn test_no_content(#[future] app: TestApp) -> anyhow::Result<()> {
    let app = app.await;

    let outcome = app.client.call("deleteUser")?.with_param("id", 1).await;

    let Outcome::Success(response) = outcome else {
        anyhow::bail!("expected a success, got {outcome:?}");
    };
    assert_eq!(response.status(), 204);
    assert_eq!(response.content_type(), "none");
    assert_eq!(response.body(), &Body::Empty);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn test_unexpected_status(#[future] app: TestApp) -> anyhow::Result<()> {
    let app = app.await;

    let outcome = app.client.call("getUser")?.with_param("id", 5).await;

    let Outcome::Boundary(BoundaryError::UnexpectedStatus { status, raw_body }) = outcome else {
        anyhow::bail!("expected an unexpected status, got {outcome:?}");
    };
    assert_eq!(status, 418);
    assert_eq!(raw_body, "I'm a teapot");
    Ok(())
}

#[rstest]
#[tokio::test]
async fn test_unexpected_content_type(#[future] app: TestApp) -> anyhow::Result<()> {
    let app = app.await;

    let outcome = app.client.call("getUser")?.with_param("id", 4).await;

    let Outcome::Boundary(BoundaryError::UnexpectedContentType {
        status,
        expected,
        actual,
        raw_body,
    }) = outcome
    else {
        anyhow::bail!("expected an unexpected content type, got {outcome:?}");
    };
    assert_eq!(status, 200);
    assert_eq!(expected, vec!["application/json".to_string()]);
    assert_eq!(actual, "text/html");
    assert!(raw_body.contains("maintenance"));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn test_parse_error_keeps_raw_body(#[future] app: TestApp) -> anyhow::Result<()> {
    let app = app.await;

    let outcome = app.client.call("getUser")?.with_param("id", 3).await;

    let Outcome::Boundary(BoundaryError::Parse {
        status, raw_body, ..
    }) = &outcome
    else {
        anyhow::bail!("expected a parse error, got {outcome:?}");
    };
    assert_eq!(*status, 200);
    assert_eq!(raw_body, r#"{"bad": json}"#);
    info!(?outcome, "parse error");
    Ok(())
}

#[rstest]
#[tokio::test]
async fn test_decode_error(#[future] app: TestApp) -> anyhow::Result<()> {
    let app = app.await;

    let outcome = app.client.call("getUser")?.with_param("id", 2).await;

    let Outcome::Boundary(BoundaryError::Decode { cause, .. }) = &outcome else {
        anyhow::bail!("expected a decode error, got {outcome:?}");
    };
    assert!(cause.message().contains("id"), "{}", cause.message());
    Ok(())
}

#[rstest]
#[tokio::test]
async fn test_json_body_round_trip(#[future] app: TestApp) -> anyhow::Result<()> {
    let app = app.await;

    let created = app
        .client
        .call("createUser")?
        .json(&json!({ "name": "Bob" }))
        .await;
    let rejected = app.client.call("createUser")?.json(&json!({})).await;

    assert_eq!(created.tag(), OutcomeTag::Success(201));
    let Outcome::HttpError(response) = rejected else {
        anyhow::bail!("expected an HTTP error, got {rejected:?}");
    };
    assert_eq!(response.status(), 400);
    assert_eq!(response.value(), Some(&json!("missing name")));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn test_path_query_and_headers_are_sent(#[future] app: TestApp) -> anyhow::Result<()> {
    let app = app.await;

    let outcome = app
        .client
        .call("echo")?
        .with_param("segment", "hello world")
        .with_query_param("q", "a&b")
        .with_query_param(
            "tags",
            ParamValue::with_style(vec!["x", "y"], ParamStyle::SpaceDelimited),
        )
        .with_query_param("page", None::<u32>)
        .with_header("X-Request-ID", "req-1")
        .await;

    let response = outcome.into_result()?;
    assert_eq!(
        response.value(),
        Some(&json!({
            "segment": "hello world",
            "query": "q=a%26b&tags=x+y",
            "headers": { "x-request-id": "req-1" },
        }))
    );
    Ok(())
}
