//! Partial updates through the `Accounts` service.

use karen::user::PartialUser;

use crate::helpers::*;

#[tokio::test]
async fn test_avatar_patch_keeps_everything_else() {
    let accounts = test_accounts().await;
    let created = accounts
        .create(new_user_request("Ana", "ana@x.com", "secret1"))
        .await
        .unwrap();
    assert_eq!(created.id, 1);

    let patched = accounts
        .patch(1, PartialUser::new().with_avatar_url("http://x/a.png"))
        .await
        .unwrap();

    assert_eq!(patched.id, 1);
    assert_eq!(patched.name, "Ana");
    assert_eq!(patched.email, "ana@x.com");
    assert_eq!(patched.avatar_url.as_deref(), Some("http://x/a.png"));
    assert_eq!(patched.password_hash, created.password_hash);

    // And it was persisted
    assert_eq!(accounts.read(1).await.unwrap(), patched);
}

#[tokio::test]
async fn test_empty_patch_rejected_before_store() {
    let (accounts, store) = counted_accounts().await;
    let user = accounts
        .create(new_user_request("Ana", "ana@x.com", "secret1"))
        .await
        .unwrap();
    let calls_before = store.calls();

    for patch in [
        PartialUser::new(),
        PartialUser::new().with_name("").with_email("").with_password(""),
        serde_json::from_str(r#"{"name":null,"unknown":"x"}"#).unwrap(),
    ] {
        let err = accounts.patch(user.id, patch).await.unwrap_err();
        assert!(err.is_validation_error());
    }
    assert_eq!(store.calls(), calls_before);
}

#[tokio::test]
async fn test_password_patch() {
    let accounts = test_accounts().await;
    let user = accounts
        .create(new_user_request("Ana", "ana@x.com", "secret1"))
        .await
        .unwrap();

    accounts
        .patch(user.id, PartialUser::new().with_password("secret2"))
        .await
        .unwrap();

    assert!(
        accounts
            .authenticate("ana@x.com", "secret1")
            .await
            .unwrap_err()
            .is_authentication_error()
    );
    accounts.authenticate("ana@x.com", "secret2").await.unwrap();
}

#[tokio::test]
async fn test_email_patch_moves_login() {
    let accounts = test_accounts().await;
    let user = accounts
        .create(new_user_request("Ana", "ana@x.com", "secret1"))
        .await
        .unwrap();

    accounts
        .patch(user.id, PartialUser::new().with_email("ana@y.org"))
        .await
        .unwrap();

    accounts.authenticate("ana@y.org", "secret1").await.unwrap();
    assert!(
        accounts
            .authenticate("ana@x.com", "secret1")
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_email_patch_onto_taken_email_conflicts() {
    let accounts = test_accounts().await;
    accounts
        .create(new_user_request("Ana", "ana@x.com", "secret1"))
        .await
        .unwrap();
    let bea = accounts
        .create(new_user_request("Bea", "bea@x.com", "secret2"))
        .await
        .unwrap();

    let err = accounts
        .patch(bea.id, PartialUser::new().with_email("ana@x.com"))
        .await
        .unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(accounts.read(bea.id).await.unwrap().email, "bea@x.com");
}

#[tokio::test]
async fn test_avatar_clear_versus_empty() {
    let accounts = test_accounts().await;
    let user = accounts
        .create(new_user_request("Ana", "ana@x.com", "p").with_avatar_url("http://x/a.png"))
        .await
        .unwrap();

    let emptied = accounts
        .patch(user.id, serde_json::from_str(r#"{"avatar_url":""}"#).unwrap())
        .await
        .unwrap();
    assert_eq!(emptied.avatar_url, Some(String::new()));

    let cleared = accounts
        .patch(user.id, serde_json::from_str(r#"{"avatar_url":null}"#).unwrap())
        .await
        .unwrap();
    assert_eq!(cleared.avatar_url, None);
    assert_eq!(accounts.read(user.id).await.unwrap().avatar_url, None);
}

#[tokio::test]
async fn test_patch_missing_user() {
    let accounts = test_accounts().await;
    let err = accounts
        .patch(99, PartialUser::new().with_name("Ghost"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}
