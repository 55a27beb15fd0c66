use crate::fixtures::test_app::TestApp;
use serde_json::Value;

#[tokio::test]
async fn social_actions_leave_notifications_behind() {
    let app = TestApp::spawn().await;
    let a = app
        .register_user("Alice", "Anderson", "alice@backbook.test", "Password1!")
        .await;
    let b = app
        .register_user("Bobby", "Brown", "bobby@backbook.test", "Password1!")
        .await;

    app.send_friend_request(&a, &b).await;

    let me_b = app.me(&b).await;
    assert_eq!(me_b["unseen_notifications"], 1);

    let resp = app
        .auth_get("/api/v1/notifications", &b.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["kind"], "friend_request");
    assert_eq!(items[0]["sender"]["username"], a.username.as_str());
}

#[tokio::test]
async fn opening_the_list_resets_the_badge() {
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

    app.send_friend_request(&a, &b).await;
    app.auth_put(&format!("/api/v1/friends/follow/{}", b.id), &c.access_token)
        .send()
        .await
        .unwrap();

    let me_b = app.me(&b).await;
    assert_eq!(me_b["unseen_notifications"], 2);

    app.auth_get("/api/v1/notifications", &b.access_token)
        .send()
        .await
        .unwrap();

    let me_b = app.me(&b).await;
    assert_eq!(me_b["unseen_notifications"], 0);

    // The records survive, flagged as seen.
    let resp = app
        .auth_get("/api/v1/notifications", &b.access_token)
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|n| n["seen"] == true));
}

#[tokio::test]
async fn accepting_notifies_the_original_sender() {
    let app = TestApp::spawn().await;
    let a = app
        .register_user("Alice", "Anderson", "alice@backbook.test", "Password1!")
        .await;
    let b = app
        .register_user("Bobby", "Brown", "bobby@backbook.test", "Password1!")
        .await;

    app.befriend(&a, &b).await;

    let resp = app
        .auth_get("/api/v1/notifications", &a.access_token)
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["kind"], "friend_accept");
    assert_eq!(items[0]["sender"]["username"], b.username.as_str());
}

#[tokio::test]
async fn reacting_to_your_own_post_stays_quiet() {
    let app = TestApp::spawn().await;
    let a = app
        .register_user("Alice", "Anderson", "alice@backbook.test", "Password1!")
        .await;
    let post_id = app.create_post(&a, "self five").await;

    app.auth_put(&format!("/api/v1/posts/{}/react", post_id), &a.access_token)
        .json(&serde_json::json!({ "reaction": "like" }))
        .send()
        .await
        .unwrap();
    app.auth_post(&format!("/api/v1/posts/{}/comments", post_id), &a.access_token)
        .json(&serde_json::json!({ "text": "nice one, me" }))
        .send()
        .await
        .unwrap();

    let count = app
        .db
        .collection::<bson::Document>("notifications")
        .count_documents(bson::doc! {})
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn reactions_and_comments_notify_the_post_owner() {
    let app = TestApp::spawn().await;
    let a = app
        .register_user("Alice", "Anderson", "alice@backbook.test", "Password1!")
        .await;
    let b = app
        .register_user("Bobby", "Brown", "bobby@backbook.test", "Password1!")
        .await;
    let post_id = app.create_post(&a, "react to this").await;

    app.auth_put(&format!("/api/v1/posts/{}/react", post_id), &b.access_token)
        .json(&serde_json::json!({ "reaction": "wow" }))
        .send()
        .await
        .unwrap();
    app.auth_post(&format!("/api/v1/posts/{}/comments", post_id), &b.access_token)
        .json(&serde_json::json!({ "text": "impressive" }))
        .send()
        .await
        .unwrap();

    let resp = app
        .auth_get("/api/v1/notifications", &a.access_token)
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    let kinds: Vec<&str> = json["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds.len(), 2);
    assert!(kinds.contains(&"react"));
    assert!(kinds.contains(&"comment"));
}

#[tokio::test]
async fn mark_seen_without_opening_the_list() {
    let app = TestApp::spawn().await;
    let a = app
        .register_user("Alice", "Anderson", "alice@backbook.test", "Password1!")
        .await;
    let b = app
        .register_user("Bobby", "Brown", "bobby@backbook.test", "Password1!")
        .await;

    app.send_friend_request(&a, &b).await;

    let resp = app
        .auth_put("/api/v1/notifications/seen", &b.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let me_b = app.me(&b).await;
    assert_eq!(me_b["unseen_notifications"], 0);
}
