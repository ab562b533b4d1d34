use anyhow::Result;
use stacksift::session::storage::{ACCESS_TOKEN_KEY, USER_KEY};
use stacksift::session::{
    FileStorage, LocalStorage, LogoutReason, Session, SessionContext, SessionEvent,
};
use stacksift::testing::user;
use std::sync::Arc;

#[test]
fn test_session_survives_restart() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("session.json");

    let context = SessionContext::init(Arc::new(FileStorage::new(&path)))?;
    context.start(Session::new(user("u1", &["ADMIN"]), "t1"));

    let restored = SessionContext::init(Arc::new(FileStorage::new(&path)))?;
    let session = restored.current().expect("session restored");
    assert_eq!(session.access_token, "t1");
    assert_eq!(session.user_id(), "u1");
    assert!(restored.is_admin());
    Ok(())
}

#[test]
fn test_logout_clears_memory_and_storage_together() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let storage = Arc::new(FileStorage::new(dir.path().join("session.json")));
    let context = SessionContext::init(storage.clone())?;
    context.start(Session::new(user("u1", &[]), "t1"));

    context.clear(LogoutReason::UserRequested);

    assert!(!context.is_authenticated());
    assert_eq!(storage.get(ACCESS_TOKEN_KEY)?, None);
    assert_eq!(storage.get(USER_KEY)?, None);

    let restored = SessionContext::init(storage)?;
    assert!(restored.current().is_none());
    Ok(())
}

#[test]
fn test_unreadable_user_is_discarded_on_startup() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let storage = Arc::new(FileStorage::new(dir.path().join("session.json")));
    storage.set_many(&[
        (ACCESS_TOKEN_KEY, "t1".to_string()),
        (USER_KEY, "{not json".to_string()),
    ])?;

    let context = SessionContext::init(storage.clone())?;

    assert!(!context.is_authenticated());
    assert_eq!(storage.get(ACCESS_TOKEN_KEY)?, None);
    Ok(())
}

#[test]
fn test_truncated_session_file_starts_signed_out() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("session.json");
    std::fs::write(&path, r#"{"accessToken": "t1", "user": "#)?;

    let storage = Arc::new(FileStorage::new(&path));
    let context = SessionContext::init(storage.clone())?;

    assert!(!context.is_authenticated());
    assert_eq!(context.access_token(), None);
    assert_eq!(storage.get(ACCESS_TOKEN_KEY)?, None);

    context.start(Session::new(user("u1", &[]), "t2"));
    let restored = SessionContext::init(Arc::new(FileStorage::new(&path)))?;
    assert_eq!(restored.access_token().as_deref(), Some("t2"));
    Ok(())
}

#[test]
fn test_token_without_user_is_not_a_session() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let storage = Arc::new(FileStorage::new(dir.path().join("session.json")));
    storage.set(ACCESS_TOKEN_KEY, "t1".to_string())?;

    let context = SessionContext::init(storage)?;
    assert!(context.current().is_none());
    Ok(())
}

#[test]
fn test_profile_update_keeps_token() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("session.json");
    let context = SessionContext::init(Arc::new(FileStorage::new(&path)))?;
    context.start(Session::new(user("u1", &[]), "t1"));

    let mut updated = user("u1", &[]);
    updated.name = "Ada Lovelace".to_string();
    updated.bio = Some("Analytical".to_string());
    context.set_user(updated);

    let restored = SessionContext::init(Arc::new(FileStorage::new(&path)))?;
    let session = restored.current().expect("session restored");
    assert_eq!(session.display_name(), "Ada Lovelace");
    assert_eq!(session.access_token, "t1");
    Ok(())
}

#[tokio::test]
async fn test_transitions_are_broadcast() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let context = SessionContext::init(Arc::new(FileStorage::new(dir.path().join("s.json"))))?;
    let mut events = context.subscribe();

    context.start(Session::new(user("u1", &[]), "t1"));
    context.set_access_token("t2");
    context.clear(LogoutReason::UserRequested);

    assert_eq!(
        events.recv().await?,
        SessionEvent::LoggedIn {
            user_id: "u1".to_string()
        }
    );
    assert_eq!(events.recv().await?, SessionEvent::TokenRefreshed);
    assert_eq!(
        events.recv().await?,
        SessionEvent::LoggedOut {
            reason: LogoutReason::UserRequested
        }
    );
    Ok(())
}
