use anyhow::Result;
use serde_json::json;
use stacksift::api::endpoints;
use stacksift::api::{ApiRequest, Method};
use stacksift::error::ApiError;
use stacksift::session::storage::ACCESS_TOKEN_KEY;
use stacksift::session::{LocalStorage, LogoutReason, SessionEvent};
use stacksift::services::Services;
use stacksift::testing::{client_with_session, user_json};

#[tokio::test]
async fn test_bearer_attached_to_protected_requests() -> Result<()> {
    let (client, transport, _) = client_with_session(Some("t1"), &[]);
    transport.respond(Method::Get, endpoints::COLLECTIONS, 200, json!([]));

    let services = Services::new(client);
    services.collections.list().await?;

    let sent = transport.sent_to(endpoints::COLLECTIONS);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].bearer.as_deref(), Some("t1"));
    Ok(())
}

#[tokio::test]
async fn test_public_endpoints_never_carry_a_token() -> Result<()> {
    let (client, transport, _) = client_with_session(Some("stale"), &[]);
    transport.respond(
        Method::Post,
        endpoints::LOGIN,
        200,
        json!({ "user": user_json("u2", &[]), "accessToken": "fresh" }),
    );

    let services = Services::new(client.clone());
    let session = services.auth.login("u2@example.com", "secret").await?;

    assert_eq!(session.access_token, "fresh");
    assert_eq!(transport.sent_to(endpoints::LOGIN)[0].bearer, None);
    assert_eq!(client.session().user_id().as_deref(), Some("u2"));
    Ok(())
}

#[tokio::test]
async fn test_expired_token_is_refreshed_and_request_retried_once() -> Result<()> {
    let (client, transport, storage) = client_with_session(Some("t1"), &[]);
    transport
        .respond(Method::Get, endpoints::STATS, 401, json!({ "message": "jwt expired" }))
        .respond(Method::Get, endpoints::STATS, 200, json!({ "tools": 4, "collections": 2 }));
    transport.respond(
        Method::Post,
        endpoints::REFRESH_TOKEN,
        200,
        json!({ "accessToken": "t2" }),
    );

    let services = Services::new(client.clone());
    let stats = services.profile.stats().await?;

    assert_eq!(stats.tools, 4);
    assert_eq!(transport.count(endpoints::REFRESH_TOKEN), 1);

    let attempts = transport.sent_to(endpoints::STATS);
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[0].bearer.as_deref(), Some("t1"));
    assert_eq!(attempts[1].bearer.as_deref(), Some("t2"));

    assert_eq!(client.session().access_token().as_deref(), Some("t2"));
    assert_eq!(storage.get(ACCESS_TOKEN_KEY)?.as_deref(), Some("t2"));
    Ok(())
}

#[tokio::test]
async fn test_refresh_request_carries_no_bearer() -> Result<()> {
    let (client, transport, _) = client_with_session(Some("t1"), &[]);
    transport.respond(Method::Post, endpoints::REFRESH_TOKEN, 200, json!({ "accessToken": "t2" }));

    client.refresh().await?;

    assert_eq!(transport.sent_to(endpoints::REFRESH_TOKEN)[0].bearer, None);
    Ok(())
}

#[tokio::test]
async fn test_failed_refresh_ends_the_session() -> Result<()> {
    let (client, transport, storage) = client_with_session(Some("t1"), &[]);
    let mut events = client.session().subscribe();
    transport.respond(Method::Get, endpoints::STATS, 401, json!({ "message": "jwt expired" }));
    transport.respond(
        Method::Post,
        endpoints::REFRESH_TOKEN,
        401,
        json!({ "message": "No refresh token" }),
    );

    let services = Services::new(client.clone());
    let err = services.profile.stats().await.unwrap_err();

    assert_eq!(err, ApiError::SessionExpired);
    assert!(!client.session().is_authenticated());
    assert!(storage.is_empty());
    assert_eq!(transport.count(endpoints::STATS), 1);
    assert_eq!(
        events.recv().await?,
        SessionEvent::LoggedOut {
            reason: LogoutReason::RefreshFailed
        }
    );
    Ok(())
}

#[tokio::test]
async fn test_network_failure_during_refresh_ends_the_session() -> Result<()> {
    let (client, transport, _) = client_with_session(Some("t1"), &[]);
    transport.respond(Method::Get, endpoints::COLLECTIONS, 401, json!({}));
    transport.fail(
        Method::Post,
        endpoints::REFRESH_TOKEN,
        ApiError::Transport("connection reset".to_string()),
    );

    let services = Services::new(client.clone());
    let err = services.collections.list().await.unwrap_err();

    assert_eq!(err, ApiError::SessionExpired);
    assert!(!client.session().is_authenticated());
    Ok(())
}

#[tokio::test]
async fn test_second_unauthorized_is_not_refreshed_again() -> Result<()> {
    let (client, transport, _) = client_with_session(Some("t1"), &[]);
    transport.respond(Method::Get, endpoints::STATS, 401, json!({ "message": "Forbidden token" }));
    transport.respond(Method::Post, endpoints::REFRESH_TOKEN, 200, json!({ "accessToken": "t2" }));

    let services = Services::new(client);
    let err = services.profile.stats().await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized { ref message } if message == "Forbidden token"));
    assert_eq!(transport.count(endpoints::REFRESH_TOKEN), 1);
    assert_eq!(transport.count(endpoints::STATS), 2);
    Ok(())
}

#[tokio::test]
async fn test_unauthorized_login_is_not_refreshed() -> Result<()> {
    let (client, transport, _) = client_with_session(None, &[]);
    transport.respond(
        Method::Post,
        endpoints::LOGIN,
        401,
        json!({ "message": "Invalid credentials" }),
    );

    let services = Services::new(client);
    let err = services.auth.login("ada@example.com", "wrong").await.unwrap_err();

    assert_eq!(
        err,
        ApiError::Unauthorized {
            message: "Invalid credentials".to_string()
        }
    );
    assert_eq!(transport.count(endpoints::REFRESH_TOKEN), 0);
    Ok(())
}

#[tokio::test]
async fn test_other_errors_pass_through_with_server_message() -> Result<()> {
    let (client, transport, _) = client_with_session(Some("t1"), &[]);
    transport.respond(
        Method::Post,
        endpoints::COLLECTIONS,
        409,
        json!({ "message": "Folder already exists" }),
    );

    let services = Services::new(client.clone());
    let err = services.collections.create("Design").await.unwrap_err();

    assert_eq!(err.server_message(), Some("Folder already exists"));
    assert_eq!(transport.count(endpoints::REFRESH_TOKEN), 0);
    assert!(client.session().is_authenticated());
    Ok(())
}

#[tokio::test]
async fn test_refresh_without_user_still_authenticates_the_retry() -> Result<()> {
    let (client, transport, storage) = client_with_session(None, &[]);
    transport
        .respond(Method::Get, endpoints::STATS, 401, json!({ "message": "jwt missing" }))
        .respond(Method::Get, endpoints::STATS, 200, json!({ "tools": 1, "collections": 0 }));
    transport.respond(Method::Post, endpoints::REFRESH_TOKEN, 200, json!({ "accessToken": "t9" }));

    let services = Services::new(client.clone());
    let stats = services.profile.stats().await?;

    assert_eq!(stats.tools, 1);
    let attempts = transport.sent_to(endpoints::STATS);
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[0].bearer, None);
    assert_eq!(attempts[1].bearer.as_deref(), Some("t9"));

    assert_eq!(storage.get(ACCESS_TOKEN_KEY)?.as_deref(), Some("t9"));
    assert!(!client.session().is_authenticated());
    Ok(())
}

#[tokio::test]
async fn test_rejected_refresh_call_through_execute_ends_the_session() -> Result<()> {
    let (client, transport, storage) = client_with_session(Some("t1"), &[]);
    let mut events = client.session().subscribe();
    transport.respond(
        Method::Post,
        endpoints::REFRESH_TOKEN,
        401,
        json!({ "message": "Refresh token expired" }),
    );

    let err = client
        .execute(ApiRequest::post(endpoints::REFRESH_TOKEN))
        .await
        .unwrap_err();

    assert_eq!(err, ApiError::SessionExpired);
    assert!(storage.is_empty());
    assert_eq!(transport.sent().len(), 1);
    assert_eq!(
        events.recv().await?,
        SessionEvent::LoggedOut {
            reason: LogoutReason::RefreshFailed
        }
    );
    Ok(())
}

#[tokio::test]
async fn test_unreachable_refresh_call_through_execute_ends_the_session() -> Result<()> {
    let (client, transport, storage) = client_with_session(Some("t1"), &[]);
    let mut events = client.session().subscribe();
    transport.fail(
        Method::Post,
        endpoints::REFRESH_TOKEN,
        ApiError::Transport("connection refused".to_string()),
    );

    let err = client
        .execute(ApiRequest::post(endpoints::REFRESH_TOKEN))
        .await
        .unwrap_err();

    assert_eq!(err, ApiError::SessionExpired);
    assert!(storage.is_empty());
    assert!(!client.session().is_authenticated());
    assert_eq!(transport.sent().len(), 1);
    assert_eq!(
        events.recv().await?,
        SessionEvent::LoggedOut {
            reason: LogoutReason::RefreshFailed
        }
    );
    Ok(())
}
