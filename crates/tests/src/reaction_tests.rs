use crate::fixtures::test_app::TestApp;
use bson::doc;
use serde_json::Value;

#[tokio::test]
async fn reacting_twice_with_same_kind_removes_the_reaction() {
    let app = TestApp::spawn().await;
    let a = app
        .register_user("Alice", "Anderson", "alice@backbook.test", "Password1!")
        .await;
    let post_id = app.create_post(&a, "toggle me").await;

    let resp = app
        .auth_put(&format!("/api/v1/posts/{}/react", post_id), &a.access_token)
        .json(&serde_json::json!({ "reaction": "like" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["viewer_reaction"], "like");
    assert_eq!(json["reactions"]["total_count"], 1);
    assert_eq!(json["reactions"]["types"]["like"], 1);

    // Same kind again: toggle off.
    let resp = app
        .auth_put(&format!("/api/v1/posts/{}/react", post_id), &a.access_token)
        .json(&serde_json::json!({ "reaction": "like" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert!(json["viewer_reaction"].is_null());
    assert_eq!(json["reactions"]["total_count"], 0);

    let count = app
        .db
        .collection::<bson::Document>("reactions")
        .count_documents(doc! {})
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn changing_kind_overwrites_instead_of_stacking() {
    let app = TestApp::spawn().await;
    let a = app
        .register_user("Alice", "Anderson", "alice@backbook.test", "Password1!")
        .await;
    let post_id = app.create_post(&a, "feelings").await;

    app.auth_put(&format!("/api/v1/posts/{}/react", post_id), &a.access_token)
        .json(&serde_json::json!({ "reaction": "like" }))
        .send()
        .await
        .unwrap();

    let resp = app
        .auth_put(&format!("/api/v1/posts/{}/react", post_id), &a.access_token)
        .json(&serde_json::json!({ "reaction": "love" }))
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["viewer_reaction"], "love");
    assert_eq!(json["reactions"]["total_count"], 1);
    assert_eq!(json["reactions"]["types"]["like"], 0);
    assert_eq!(json["reactions"]["types"]["love"], 1);

    let count = app
        .db
        .collection::<bson::Document>("reactions")
        .count_documents(doc! {})
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn stats_aggregate_across_users_and_annotate_the_viewer() {
    let app = TestApp::spawn().await;
    let a = app
        .register_user("Alice", "Anderson", "alice@backbook.test", "Password1!")
        .await;
    let b = app
        .register_user("Bobby", "Brown", "bobby@backbook.test", "Password1!")
        .await;
    let post_id = app.create_post(&a, "popular").await;

    app.auth_put(&format!("/api/v1/posts/{}/react", post_id), &a.access_token)
        .json(&serde_json::json!({ "reaction": "haha" }))
        .send()
        .await
        .unwrap();
    app.auth_put(&format!("/api/v1/posts/{}/react", post_id), &b.access_token)
        .json(&serde_json::json!({ "reaction": "wow" }))
        .send()
        .await
        .unwrap();

    let resp = app
        .auth_get(&format!("/api/v1/posts/{}/reacts", post_id), &b.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["reactions"]["total_count"], 2);
    assert_eq!(json["reactions"]["types"]["haha"], 1);
    assert_eq!(json["reactions"]["types"]["wow"], 1);
    assert_eq!(json["viewer_reaction"], "wow");
}

#[tokio::test]
async fn reacting_to_a_missing_post_is_not_found() {
    let app = TestApp::spawn().await;
    let a = app
        .register_user("Alice", "Anderson", "alice@backbook.test", "Password1!")
        .await;

    let resp = app
        .auth_put(
            &format!("/api/v1/posts/{}/react", bson::oid::ObjectId::new().to_hex()),
            &a.access_token,
        )
        .json(&serde_json::json!({ "reaction": "sad" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}
