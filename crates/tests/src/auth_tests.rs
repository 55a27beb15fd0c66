use crate::fixtures::test_app::TestApp;
use bson::doc;
use serde_json::Value;
use sha2::{Digest, Sha256};

#[tokio::test]
async fn register_returns_tokens_and_a_usable_session() {
    let app = TestApp::spawn().await;
    let a = app
        .register_user("Alice", "Anderson", "alice@backbook.test", "Password1!")
        .await;

    assert!(a.username.to_lowercase().starts_with("aliceanderson"));

    let me = app.me(&a).await;
    assert_eq!(me["email"], "alice@backbook.test");
    assert_eq!(me["verified"], false);
    assert_eq!(me["friends_count"], 0);
    assert_eq!(me["unseen_notifications"], 0);
    // Secrets never leave the server.
    assert!(me.get("password_hash").is_none());
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let app = TestApp::spawn().await;
    app.register_user("Alice", "Anderson", "alice@backbook.test", "Password1!")
        .await;

    let resp = app
        .client
        .post(app.url("/api/v1/auth/register"))
        .json(&serde_json::json!({
            "first_name": "Alice",
            "last_name": "Again",
            "email": "alice@backbook.test",
            "password": "Password1!",
            "gender": "other",
            "birth_year": 1995,
            "birth_month": 6,
            "birth_day": 15,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 409);
}

#[tokio::test]
async fn colliding_names_get_distinct_usernames() {
    let app = TestApp::spawn().await;
    let first = app
        .register_user("Alice", "Anderson", "alice1@backbook.test", "Password1!")
        .await;
    let second = app
        .register_user("Alice", "Anderson", "alice2@backbook.test", "Password1!")
        .await;
    assert_ne!(first.username, second.username);
}

#[tokio::test]
async fn login_checks_credentials_uniformly() {
    let app = TestApp::spawn().await;
    app.register_user("Alice", "Anderson", "alice@backbook.test", "Password1!")
        .await;

    let resp = app
        .client
        .post(app.url("/api/v1/auth/login"))
        .json(&serde_json::json!({
            "email": "alice@backbook.test",
            "password": "Password1!",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert!(json["access_token"].as_str().is_some());
    assert_eq!(json["user"]["email"], "alice@backbook.test");

    // Wrong password and unknown email fail the same way.
    for (email, password) in [
        ("alice@backbook.test", "WrongPassword1!"),
        ("nobody@backbook.test", "Password1!"),
    ] {
        let resp = app
            .client
            .post(app.url("/api/v1/auth/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 401);
    }
}

#[tokio::test]
async fn protected_routes_reject_missing_and_garbage_tokens() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .get(app.url("/api/v1/auth/me"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);

    let resp = app
        .client
        .get(app.url("/api/v1/auth/me"))
        .header("Authorization", "Bearer not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
async fn the_access_token_cookie_carries_a_session_on_its_own() {
    let app = TestApp::spawn().await;
    let a = app
        .register_user("Alice", "Anderson", "alice@backbook.test", "Password1!")
        .await;

    // Register set the auth cookies on the client's store; no bearer
    // header needed.
    let resp = app
        .client
        .get(app.url("/api/v1/auth/me"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["email"], a.email.as_str());
}

#[tokio::test]
async fn email_verification_consumes_the_stored_code() {
    let app = TestApp::spawn().await;
    let a = app
        .register_user("Alice", "Anderson", "alice@backbook.test", "Password1!")
        .await;

    // The code itself only goes out by mail; plant a known one.
    let code = "123456";
    let code_hash = hex::encode(Sha256::digest(code.as_bytes()));
    app.db
        .collection::<bson::Document>("users")
        .update_one(
            doc! { "email": &a.email },
            doc! { "$set": { "verification_code_hash": &code_hash } },
        )
        .await
        .unwrap();

    let resp = app
        .auth_post("/api/v1/auth/verify-email", &a.access_token)
        .json(&serde_json::json!({ "code": "000000" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);

    let resp = app
        .auth_post("/api/v1/auth/verify-email", &a.access_token)
        .json(&serde_json::json!({ "code": code }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let me = app.me(&a).await;
    assert_eq!(me["verified"], true);

    // A second attempt has nothing left to verify.
    let resp = app
        .auth_post("/api/v1/auth/verify-email", &a.access_token)
        .json(&serde_json::json!({ "code": code }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn forgot_password_never_reveals_account_existence() {
    let app = TestApp::spawn().await;
    app.register_user("Alice", "Anderson", "alice@backbook.test", "Password1!")
        .await;

    for email in ["alice@backbook.test", "nobody@backbook.test"] {
        let resp = app
            .client
            .post(app.url("/api/v1/auth/forgot-password"))
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 200);
    }

    // Only the real account got a code.
    let user = app
        .db
        .collection::<bson::Document>("users")
        .find_one(doc! { "email": "alice@backbook.test" })
        .await
        .unwrap()
        .unwrap();
    assert!(user.get_str("reset_code_hash").is_ok());
}

#[tokio::test]
async fn full_password_reset_flow() {
    let app = TestApp::spawn().await;
    let a = app
        .register_user("Alice", "Anderson", "alice@backbook.test", "Password1!")
        .await;

    app.client
        .post(app.url("/api/v1/auth/forgot-password"))
        .json(&serde_json::json!({ "email": &a.email }))
        .send()
        .await
        .unwrap();

    // Swap in a code we know, keeping the expiry the server set.
    let code = "654321";
    let code_hash = hex::encode(Sha256::digest(code.as_bytes()));
    app.db
        .collection::<bson::Document>("users")
        .update_one(
            doc! { "email": &a.email },
            doc! { "$set": { "reset_code_hash": &code_hash } },
        )
        .await
        .unwrap();

    let resp = app
        .client
        .post(app.url("/api/v1/auth/validate-reset-code"))
        .json(&serde_json::json!({ "email": &a.email, "code": "999999" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);

    let resp = app
        .client
        .post(app.url("/api/v1/auth/validate-reset-code"))
        .json(&serde_json::json!({ "email": &a.email, "code": code }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    let reset_token = json["reset_token"].as_str().unwrap().to_string();

    let resp = app
        .client
        .post(app.url("/api/v1/auth/reset-password"))
        .json(&serde_json::json!({
            "reset_token": reset_token,
            "password": "NewPassword1!",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    // Old password out, new password in.
    let resp = app
        .client
        .post(app.url("/api/v1/auth/login"))
        .json(&serde_json::json!({ "email": &a.email, "password": "Password1!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);

    let resp = app
        .client
        .post(app.url("/api/v1/auth/login"))
        .json(&serde_json::json!({ "email": &a.email, "password": "NewPassword1!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
}

#[tokio::test]
async fn access_tokens_are_not_reset_tokens() {
    let app = TestApp::spawn().await;
    let a = app
        .register_user("Alice", "Anderson", "alice@backbook.test", "Password1!")
        .await;

    let resp = app
        .client
        .post(app.url("/api/v1/auth/reset-password"))
        .json(&serde_json::json!({
            "reset_token": a.access_token,
            "password": "NewPassword1!",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
async fn invalid_birth_date_is_rejected() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/api/v1/auth/register"))
        .json(&serde_json::json!({
            "first_name": "Alice",
            "last_name": "Anderson",
            "email": "alice@backbook.test",
            "password": "Password1!",
            "gender": "other",
            "birth_year": 1995,
            "birth_month": 2,
            "birth_day": 30,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}
