use karen::backend::{UserStore, database::InMemory};
use tempfile::TempDir;

use crate::helpers::new_user;

#[tokio::test]
async fn test_in_memory_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("karen.json");

    let (ana, bea) = {
        let store = InMemory::new();
        let ana = store.create_user(&new_user("ana@x.com")).await.unwrap();
        let bea = store.create_user(&new_user("bea@x.com")).await.unwrap();
        store.save_to_file(&path).await.unwrap();
        (ana, bea)
    };
    assert!(path.exists());

    let loaded = InMemory::load_from_file(&path).await.unwrap();
    assert_eq!(loaded.len().await, 2);
    assert_eq!(loaded.read_user_by_email("ana@x.com").await.unwrap().id, ana);
    assert_eq!(loaded.read_user(bea).await.unwrap().email, "bea@x.com");

    // Uniqueness survives the round trip
    assert!(
        loaded
            .create_user(&new_user("ana@x.com"))
            .await
            .unwrap_err()
            .is_conflict()
    );
}

#[tokio::test]
async fn test_id_counter_survives_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("karen.json");

    let deleted = {
        let store = InMemory::new();
        store.create_user(&new_user("a@x.com")).await.unwrap();
        let b = store.create_user(&new_user("b@x.com")).await.unwrap();
        store.delete_user(b).await.unwrap();
        store.save_to_file(&path).await.unwrap();
        b
    };

    let loaded = InMemory::load_from_file(&path).await.unwrap();
    let next = loaded.create_user(&new_user("c@x.com")).await.unwrap();
    assert!(next > deleted);
}

#[tokio::test]
async fn test_saved_file_has_no_plaintext_fields() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("karen.json");

    let store = InMemory::new();
    store.create_user(&new_user("ana@x.com")).await.unwrap();
    store.save_to_file(&path).await.unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let user = &json["users"][0];
    assert!(user.get("password").is_none());
    assert!(user["password_hash"].as_str().unwrap().starts_with("$argon2id$"));
}

#[tokio::test]
async fn test_load_non_existent_file() {
    let dir = TempDir::new().unwrap();
    let loaded = InMemory::load_from_file(dir.path().join("missing.json"))
        .await
        .unwrap();
    assert!(loaded.is_empty().await);
}

#[tokio::test]
async fn test_load_corrupt_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("karen.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = InMemory::load_from_file(&path).await.unwrap_err();
    assert!(err.is_database_error());
}

#[tokio::test]
async fn test_load_rejects_repeated_user_id() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("karen.json");
    std::fs::write(
        &path,
        r#"{"last_id":1,"users":[
            {"id":1,"name":"Ana","email":"a@x.com","password_hash":"h1"},
            {"id":1,"name":"Bea","email":"b@x.com","password_hash":"h2"}
        ]}"#,
    )
    .unwrap();

    let err = InMemory::load_from_file(&path).await.unwrap_err();
    assert!(err.is_database_error());
    assert!(!err.is_not_found());
}
