use anyhow::Result;
use serde_json::json;
use stacksift::api::{endpoints, Method, RequestBody};
use stacksift::error::ApiError;
use stacksift::models::{ListingDraft, ListingUpdate, ProfileUpdate, SupportMessage};
use stacksift::services::{ActionOutcome, ListingQuery, PasswordCheck, Services};
use stacksift::testing::{client_with_session, listing, listing_json, user_json};

fn json_body(body: &Option<RequestBody>) -> serde_json::Value {
    match body {
        Some(RequestBody::Json(value)) => value.clone(),
        other => panic!("expected a JSON body, got {:?}", other),
    }
}

#[tokio::test]
async fn test_submit_validates_before_sending() -> Result<()> {
    let (client, transport, _) = client_with_session(Some("t1"), &[]);
    let services = Services::new(client);

    let draft = ListingDraft {
        title: "Penpot".to_string(),
        url: "penpot.app".to_string(),
        ..Default::default()
    };
    let err = services.listings.submit(&draft).await.unwrap_err();

    assert!(matches!(err, ApiError::Validation(_)));
    assert!(transport.sent().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_submit_sends_draft_and_returns_message() -> Result<()> {
    let (client, transport, _) = client_with_session(Some("t1"), &[]);
    transport.respond(
        Method::Post,
        endpoints::ADD_POST,
        201,
        json!({ "message": "Website submitted for approval" }),
    );
    let services = Services::new(client);

    let draft = ListingDraft {
        title: "Penpot".to_string(),
        url: "https://penpot.app".to_string(),
        description: None,
        category: Some("Design".to_string()),
        tags: stacksift::models::listing::parse_tags(" design, ,open source "),
    };
    let message = services.listings.submit(&draft).await?;

    assert_eq!(message, "Website submitted for approval");
    let body = json_body(&transport.sent_to(endpoints::ADD_POST)[0].body);
    assert_eq!(body["tags"], json!(["design", "open source"]));
    assert!(body.get("description").is_none());
    Ok(())
}

#[tokio::test]
async fn test_moderation_requires_admin() -> Result<()> {
    let (client, transport, _) = client_with_session(Some("t1"), &["USER"]);
    let services = Services::new(client);
    let target = listing("p1", "Figma", "https://figma.com");

    let err = services.listings.approve(&target).await.unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));

    let err = services.listings.delete(&target).await.unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
    assert!(transport.sent().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_admin_moderation_calls() -> Result<()> {
    let (client, transport, _) = client_with_session(Some("t1"), &["ADMIN"]);
    transport.respond(Method::Put, "/post/p1/approve", 200, json!({}));
    transport.respond(Method::Put, "/post/p1", 200, json!({}));
    transport.respond(Method::Delete, "/post/p1", 200, json!({}));
    let services = Services::new(client);
    let target = listing("p1", "Figma", "https://figma.com");

    assert_eq!(services.listings.approve(&target).await?, ActionOutcome::Applied);

    let update = ListingUpdate {
        title: Some("Figma Design".to_string()),
        ..Default::default()
    };
    assert_eq!(services.listings.update(&target, &update).await?, ActionOutcome::Applied);
    assert_eq!(
        services.listings.update(&target, &ListingUpdate::default()).await?,
        ActionOutcome::Skipped
    );
    assert_eq!(services.listings.delete(&target).await?, ActionOutcome::Applied);

    let put = transport
        .sent()
        .into_iter()
        .find(|r| r.method == Method::Put && r.path == "/post/p1")
        .expect("update sent");
    assert_eq!(json_body(&put.body), json!({ "title": "Figma Design" }));
    assert_eq!(transport.count("/post/p1"), 2);
    Ok(())
}

#[tokio::test]
async fn test_pending_queue_query() -> Result<()> {
    let (client, transport, _) = client_with_session(Some("t1"), &["ADMIN"]);
    transport.respond(
        Method::Get,
        endpoints::POSTS,
        200,
        json!({ "websites": [listing_json("p3", "New tool", "https://new.tools")], "totalPages": 1 }),
    );
    let services = Services::new(client);

    let page = services.listings.list(&ListingQuery::pending(1)).await?;

    assert_eq!(page.listings.len(), 1);
    let query = &transport.sent_to(endpoints::POSTS)[0].query;
    assert!(query.contains(&("approved".to_string(), "false".to_string())));
    Ok(())
}

#[tokio::test]
async fn test_like_and_view_post_actions() -> Result<()> {
    let (client, transport, _) = client_with_session(Some("t1"), &[]);
    transport.respond(Method::Put, "/post/p1/like", 200, json!({}));
    transport.respond(Method::Put, "/post/p1/view", 200, json!({}));
    let services = Services::new(client);
    let target = listing("p1", "Figma", "https://figma.com");

    assert_eq!(services.listings.like(&target).await?, ActionOutcome::Applied);
    assert_eq!(services.listings.view(&target).await?, ActionOutcome::Applied);
    assert_eq!(transport.sent_to("/post/p1/like")[0].bearer.as_deref(), Some("t1"));
    Ok(())
}

#[tokio::test]
async fn test_collection_calls() -> Result<()> {
    let (client, transport, _) = client_with_session(Some("t1"), &[]);
    transport.respond(
        Method::Get,
        endpoints::COLLECTIONS,
        200,
        json!([{ "_id": "c1", "name": "Design", "websites": [listing_json("p1", "Figma", "https://figma.com")] }]),
    );
    transport.respond(Method::Put, "/collections/c1/add", 200, json!({}));
    transport.respond(Method::Put, "/collections/c1/remove", 200, json!({}));
    transport.respond(Method::Delete, "/collections/c1", 200, json!({}));
    let services = Services::new(client);

    let folders = services.collections.list().await?;
    assert_eq!(folders.len(), 1);
    assert!(folders[0].contains("p1"));

    let target = listing("p2", "Penpot", "https://penpot.app");
    assert_eq!(services.collections.add("c1", &target).await?, ActionOutcome::Applied);
    let add = &transport.sent_to("/collections/c1/add")[0];
    assert_eq!(json_body(&add.body), json!({ "websiteId": "p2" }));

    let ai = target.clone().into_ai_suggestion();
    assert_eq!(services.collections.add("c1", &ai).await?, ActionOutcome::Skipped);
    assert_eq!(transport.count("/collections/c1/add"), 1);

    services.collections.remove("c1", "p1").await?;
    services.collections.delete("c1").await?;
    assert_eq!(transport.count("/collections/c1"), 1);

    let err = services.collections.create("  ").await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    Ok(())
}

#[tokio::test]
async fn test_verify_password_outcomes() -> Result<()> {
    let (client, transport, _) = client_with_session(Some("t1"), &[]);
    transport
        .respond(Method::Post, endpoints::VERIFY_PASSWORD, 200, json!({ "verified": true }))
        .respond(
            Method::Post,
            endpoints::VERIFY_PASSWORD,
            400,
            json!({ "message": "This account uses Google sign-in" }),
        )
        .respond(
            Method::Post,
            endpoints::VERIFY_PASSWORD,
            400,
            json!({ "message": "Invalid password" }),
        );
    let services = Services::new(client);

    assert_eq!(services.auth.verify_password("secret").await?, PasswordCheck::Verified);
    assert_eq!(
        services.auth.verify_password("").await?,
        PasswordCheck::ExternalAccount
    );
    assert_eq!(
        services.auth.verify_password("wrong").await.unwrap_err(),
        ApiError::validation("Incorrect password")
    );
    Ok(())
}

#[tokio::test]
async fn test_profile_update_merges_user_into_session() -> Result<()> {
    let (client, transport, storage) = client_with_session(Some("t1"), &[]);
    let mut updated = user_json("u1", &[]);
    updated["name"] = json!("Ada Lovelace");
    updated["bio"] = json!("Analytical engines");
    transport.respond(Method::Put, endpoints::PROFILE, 200, json!({ "user": updated }));
    let services = Services::new(client.clone());

    let update = ProfileUpdate {
        name: "Ada Lovelace".to_string(),
        bio: "Analytical engines".to_string(),
        password: None,
    };
    let user = services.profile.update(&update).await?;

    assert_eq!(user.name, "Ada Lovelace");
    let session = client.session().current().expect("still signed in");
    assert_eq!(session.display_name(), "Ada Lovelace");
    assert_eq!(session.access_token, "t1");
    assert_eq!(storage.len(), 2);

    let body = json_body(&transport.sent_to(endpoints::PROFILE)[0].body);
    assert!(body.get("password").is_none());
    Ok(())
}

#[tokio::test]
async fn test_avatar_upload_is_multipart() -> Result<()> {
    let (client, transport, _) = client_with_session(Some("t1"), &[]);
    let mut updated = user_json("u1", &[]);
    updated["avatarUrl"] = json!("https://cdn.example.com/u1.png");
    transport.respond(Method::Post, endpoints::AVATAR, 200, json!({ "user": updated }));
    let services = Services::new(client.clone());

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("me.png");
    std::fs::write(&path, [0x89, b'P', b'N', b'G'])?;

    let user = services.profile.upload_avatar(&path).await?;

    assert_eq!(user.avatar_url.as_deref(), Some("https://cdn.example.com/u1.png"));
    assert_eq!(
        client.session().user().and_then(|u| u.avatar_url),
        Some("https://cdn.example.com/u1.png".to_string())
    );
    match &transport.sent_to(endpoints::AVATAR)[0].body {
        Some(RequestBody::File {
            field, mime, bytes, ..
        }) => {
            assert_eq!(field, "avatar");
            assert_eq!(mime, "image/png");
            assert_eq!(bytes.len(), 4);
        }
        other => panic!("expected a file body, got {:?}", other),
    }

    let err = services
        .profile
        .upload_avatar(&dir.path().join("notes.txt"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    Ok(())
}

#[tokio::test]
async fn test_contact_form_validation() -> Result<()> {
    let (client, transport, _) = client_with_session(None, &[]);
    transport.respond(Method::Post, endpoints::CONTACT, 200, json!({ "message": "sent" }));
    let services = Services::new(client);

    let mut message = SupportMessage {
        name: "Ada".to_string(),
        email: "not-an-email".to_string(),
        subject: "Broken link".to_string(),
        message: "The Figma link 404s".to_string(),
    };
    assert!(services.contact.send(&message).await.is_err());
    assert_eq!(transport.count(endpoints::CONTACT), 0);

    message.email = "ada@example.com".to_string();
    services.contact.send(&message).await?;
    assert_eq!(transport.count(endpoints::CONTACT), 1);
    Ok(())
}
