//! Account lifecycle through the `Accounts` service: create, authenticate,
//! read, delete.

use karen::{
    backend::UserStore,
    user::{Field, PartialUser},
};

use crate::helpers::*;

#[tokio::test]
async fn test_password_round_trip() {
    let accounts = test_accounts().await;
    accounts
        .create(new_user_request("Ana", "ana@x.com", "hunter2"))
        .await
        .expect("create");

    let user = accounts
        .authenticate("ana@x.com", "hunter2")
        .await
        .expect("correct password should authenticate");
    assert_eq!(user.email, "ana@x.com");

    let err = accounts
        .authenticate("ana@x.com", "hunter3")
        .await
        .unwrap_err();
    assert!(err.is_authentication_error());
}

#[tokio::test]
async fn test_first_user_gets_id_one() {
    let accounts = test_accounts().await;
    let user = accounts
        .create(new_user_request("Ana", "ana@x.com", "secret1"))
        .await
        .unwrap();
    assert_eq!(user.id, 1);

    let second = accounts
        .create(new_user_request("Bea", "bea@x.com", "secret2"))
        .await
        .unwrap();
    assert_eq!(second.id, 2);
}

#[tokio::test]
async fn test_duplicate_email_persists_nothing() {
    let (accounts, store) = counted_accounts().await;
    let first = accounts
        .create(new_user_request("Ana", "ana@x.com", "secret1"))
        .await
        .unwrap();

    let err = accounts
        .create(new_user_request("Impostor", "ana@x.com", "secret2"))
        .await
        .unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(store.creates(), 2);

    // The original row is untouched and still the only owner of the email
    let owner = store.read_user_by_email("ana@x.com").await.unwrap();
    assert_eq!(owner.id, first.id);
    assert_eq!(owner.name, "Ana");

    // The failed insert did not consume a visible row
    let next = accounts
        .create(new_user_request("Bea", "bea@x.com", "secret3"))
        .await
        .unwrap();
    assert!(store.read_user(next.id).await.is_ok());
    assert!(accounts.read(first.id).await.is_ok());
}

#[tokio::test]
async fn test_create_with_empty_password_makes_no_store_call() {
    let (accounts, store) = counted_accounts().await;

    let err = accounts
        .create(new_user_request("Ana", "ana@x.com", ""))
        .await
        .unwrap_err();
    assert!(err.is_validation_error());
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn test_create_requires_every_field() {
    let (accounts, store) = counted_accounts().await;

    let cases = [
        PartialUser::new().with_email("a@x.com").with_password("p"),
        PartialUser::new().with_name("Ana").with_password("p"),
        PartialUser::new().with_name("Ana").with_email("   "),
        PartialUser::new(),
    ];
    for request in cases {
        let err = accounts.create(request).await.unwrap_err();
        assert!(err.is_validation_error(), "{err}");
    }
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn test_create_keeps_avatar_states() {
    let accounts = test_accounts().await;

    let with_empty = accounts
        .create(new_user_request("Ana", "ana@x.com", "p").with_avatar_url(""))
        .await
        .unwrap();
    assert_eq!(
        accounts.read(with_empty.id).await.unwrap().avatar_url,
        Some(String::new())
    );

    let without = accounts
        .create(new_user_request("Bea", "bea@x.com", "p").clear_avatar_url())
        .await
        .unwrap();
    assert_eq!(accounts.read(without.id).await.unwrap().avatar_url, None);
}

#[tokio::test]
async fn test_authenticate_unknown_email_looks_like_wrong_password() {
    let (accounts, store) = counted_accounts().await;
    accounts
        .create(new_user_request("Ana", "ana@x.com", "secret1"))
        .await
        .unwrap();

    let unknown = accounts
        .authenticate("nobody@x.com", "secret1")
        .await
        .unwrap_err();
    let wrong = accounts
        .authenticate("ana@x.com", "nope")
        .await
        .unwrap_err();

    assert!(unknown.is_authentication_error());
    assert!(!unknown.is_not_found());
    assert_eq!(unknown.to_string(), wrong.to_string());
    assert_eq!(store.reads(), 2);
}

#[tokio::test]
async fn test_authenticate_rejects_empty_input_without_lookup() {
    let (accounts, store) = counted_accounts().await;

    assert!(
        accounts
            .authenticate("", "secret1")
            .await
            .unwrap_err()
            .is_validation_error()
    );
    assert!(
        accounts
            .authenticate("ana@x.com", "")
            .await
            .unwrap_err()
            .is_validation_error()
    );
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn test_read_projected() {
    let accounts = test_accounts().await;
    let user = accounts
        .create(new_user_request("Ana", "ana@x.com", "secret1"))
        .await
        .unwrap();

    let view = accounts
        .read_projected(user.id, &[Field::Email])
        .await
        .unwrap();
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json, serde_json::json!({ "email": "ana@x.com" }));

    let full = serde_json::to_value(accounts.read_projected(user.id, &[]).await.unwrap()).unwrap();
    assert_eq!(
        full,
        serde_json::json!({
            "id": user.id,
            "name": "Ana",
            "email": "ana@x.com",
            "avatar_url": null,
        })
    );
}

#[tokio::test]
async fn test_read_missing_user() {
    let accounts = test_accounts().await;
    let err = accounts.read(404).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_delete_frees_email() {
    let accounts = test_accounts().await;
    let user = accounts
        .create(new_user_request("Ana", "ana@x.com", "secret1"))
        .await
        .unwrap();

    accounts.delete(user.id).await.unwrap();
    assert!(accounts.read(user.id).await.unwrap_err().is_not_found());
    assert!(accounts.delete(user.id).await.unwrap_err().is_not_found());

    let again = accounts
        .create(new_user_request("Ana", "ana@x.com", "secret1"))
        .await
        .unwrap();
    assert_ne!(again.id, user.id, "ids are never reused");
}
