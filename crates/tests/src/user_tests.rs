use crate::fixtures::test_app::TestApp;
use serde_json::Value;

#[tokio::test]
async fn profile_carries_relationship_and_friend_preview() {
    let app = TestApp::spawn().await;
    let a = app
        .register_user("Alice", "Anderson", "alice@backbook.test", "Password1!")
        .await;
    let b = app
        .register_user("Bobby", "Brown", "bobby@backbook.test", "Password1!")
        .await;
    let c = app
        .register_user("Carol", "Clark", "carol@backbook.test", "Password1!")
        .await;
    app.befriend(&b, &c).await;

    let resp = app
        .auth_get(&format!("/api/v1/users/{}", b.username), &a.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();

    assert_eq!(json["user"]["username"], b.username.as_str());
    assert_eq!(json["user"]["friends_count"], 1);
    assert_eq!(json["relationship"]["friends"], false);
    assert_eq!(json["relationship"]["following"], false);
    assert_eq!(json["relationship"]["request_sent"], false);
    assert_eq!(json["relationship"]["request_received"], false);

    let friends = json["friends"].as_array().unwrap();
    assert_eq!(friends.len(), 1);
    assert_eq!(friends[0]["username"], c.username.as_str());
}

#[tokio::test]
async fn unknown_profile_is_not_found() {
    let app = TestApp::spawn().await;
    let a = app
        .register_user("Alice", "Anderson", "alice@backbook.test", "Password1!")
        .await;

    let resp = app
        .auth_get("/api/v1/users/no.such.user", &a.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn details_update_round_trips() {
    let app = TestApp::spawn().await;
    let a = app
        .register_user("Alice", "Anderson", "alice@backbook.test", "Password1!")
        .await;

    let resp = app
        .auth_put("/api/v1/users/details", &a.access_token)
        .json(&serde_json::json!({
            "bio": "I write servers",
            "job": "Engineer",
            "current_city": "Lisbon",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let me = app.me(&a).await;
    assert_eq!(me["details"]["bio"], "I write servers");
    assert_eq!(me["details"]["job"], "Engineer");
    assert_eq!(me["details"]["current_city"], "Lisbon");
    assert!(me["details"]["hometown"].is_null());
}

#[tokio::test]
async fn overlong_bio_is_rejected() {
    let app = TestApp::spawn().await;
    let a = app
        .register_user("Alice", "Anderson", "alice@backbook.test", "Password1!")
        .await;

    let resp = app
        .auth_put("/api/v1/users/details", &a.access_token)
        .json(&serde_json::json!({ "bio": "x".repeat(101) }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);
}

#[tokio::test]
async fn search_matches_names_and_usernames() {
    let app = TestApp::spawn().await;
    let a = app
        .register_user("Alice", "Anderson", "alice@backbook.test", "Password1!")
        .await;
    app.register_user("Bobby", "Brown", "bobby@backbook.test", "Password1!")
        .await;

    let resp = app
        .auth_get("/api/v1/users/search/alice", &a.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    let items = json.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["username"], a.username.as_str());

    let resp = app
        .auth_get("/api/v1/users/search/zzz-no-match", &a.access_token)
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn search_history_records_and_forgets() {
    let app = TestApp::spawn().await;
    let a = app
        .register_user("Alice", "Anderson", "alice@backbook.test", "Password1!")
        .await;
    let b = app
        .register_user("Bobby", "Brown", "bobby@backbook.test", "Password1!")
        .await;

    let resp = app
        .auth_put(
            &format!("/api/v1/users/search-history/{}", b.id),
            &a.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let resp = app
        .auth_get("/api/v1/users/search-history", &a.access_token)
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    let items = json.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["username"], b.username.as_str());

    let resp = app
        .auth_delete(
            &format!("/api/v1/users/search-history/{}", b.id),
            &a.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let resp = app
        .auth_get("/api/v1/users/search-history", &a.access_token)
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn push_subscription_is_stored_verbatim() {
    let app = TestApp::spawn().await;
    let a = app
        .register_user("Alice", "Anderson", "alice@backbook.test", "Password1!")
        .await;

    let resp = app
        .auth_put("/api/v1/users/push-subscription", &a.access_token)
        .json(&serde_json::json!({
            "subscription": {
                "endpoint": "https://push.example/sub/abc",
                "keys": { "p256dh": "key", "auth": "secret" },
            }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let user = app
        .db
        .collection::<bson::Document>("users")
        .find_one(bson::doc! { "email": &a.email })
        .await
        .unwrap()
        .unwrap();
    let stored = user.get_str("push_subscription").unwrap();
    assert!(stored.contains("https://push.example/sub/abc"));
}
