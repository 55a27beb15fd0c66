use crate::fixtures::{seed::SeededUser, test_app::TestApp};
use serde_json::Value;

async fn shares_count(app: &TestApp, user: &SeededUser, post_id: &str) -> i64 {
    let resp = app
        .auth_get(&format!("/api/v1/posts/{}", post_id), &user.access_token)
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    json["shares_count"].as_i64().unwrap()
}

#[tokio::test]
async fn post_needs_text_or_images() {
    let app = TestApp::spawn().await;
    let a = app
        .register_user("Alice", "Anderson", "alice@backbook.test", "Password1!")
        .await;

    let resp = app
        .auth_post("/api/v1/posts", &a.access_token)
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);

    let resp = app
        .auth_post("/api/v1/posts", &a.access_token)
        .json(&serde_json::json!({ "images": ["https://cdn.test/a.jpg"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
}

#[tokio::test]
async fn feed_contains_own_and_followed_posts_only() {
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

    app.create_post(&a, "mine").await;
    app.create_post(&b, "from b").await;
    app.create_post(&c, "from c").await;

    app.auth_put(&format!("/api/v1/friends/follow/{}", b.id), &a.access_token)
        .send()
        .await
        .unwrap();

    let resp = app
        .auth_get("/api/v1/posts/feed", &a.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();

    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    let authors: Vec<&str> = items
        .iter()
        .map(|p| p["user"]["username"].as_str().unwrap())
        .collect();
    assert!(authors.contains(&a.username.as_str()));
    assert!(authors.contains(&b.username.as_str()));
    assert!(!authors.contains(&c.username.as_str()));
}

#[tokio::test]
async fn zero_page_params_are_clamped_not_fatal() {
    let app = TestApp::spawn().await;
    let a = app
        .register_user("Alice", "Anderson", "alice@backbook.test", "Password1!")
        .await;
    app.create_post(&a, "still here").await;

    let resp = app
        .auth_get("/api/v1/posts/feed?page=0&per_page=0", &a.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["page"], 1);
    assert_eq!(json["per_page"], 1);
    assert_eq!(json["total_pages"], 1);
    assert_eq!(json["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn share_posts_keep_the_source_count_honest() {
    let app = TestApp::spawn().await;
    let a = app
        .register_user("Alice", "Anderson", "alice@backbook.test", "Password1!")
        .await;
    let b = app
        .register_user("Bobby", "Brown", "bobby@backbook.test", "Password1!")
        .await;
    let source = app.create_post(&a, "original").await;

    let resp = app
        .auth_post("/api/v1/posts", &b.access_token)
        .json(&serde_json::json!({
            "kind": "share",
            "shared_post_id": source,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    let json: Value = resp.json().await.unwrap();
    let share_id = json["post"]["id"].as_str().unwrap().to_string();

    assert_eq!(shares_count(&app, &a, &source).await, 1);

    // Deleting the share recomputes the source back down.
    let resp = app
        .auth_delete(&format!("/api/v1/posts/{}", share_id), &b.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(shares_count(&app, &a, &source).await, 0);
}

#[tokio::test]
async fn share_requires_a_live_source() {
    let app = TestApp::spawn().await;
    let a = app
        .register_user("Alice", "Anderson", "alice@backbook.test", "Password1!")
        .await;

    let resp = app
        .auth_post("/api/v1/posts", &a.access_token)
        .json(&serde_json::json!({ "kind": "share" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);

    let resp = app
        .auth_post("/api/v1/posts", &a.access_token)
        .json(&serde_json::json!({
            "kind": "share",
            "shared_post_id": bson::oid::ObjectId::new().to_hex(),
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn soft_deleted_posts_disappear_everywhere() {
    let app = TestApp::spawn().await;
    let a = app
        .register_user("Alice", "Anderson", "alice@backbook.test", "Password1!")
        .await;
    let post_id = app.create_post(&a, "ephemeral").await;

    let resp = app
        .auth_delete(&format!("/api/v1/posts/{}", post_id), &a.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let resp = app
        .auth_get(&format!("/api/v1/posts/{}", post_id), &a.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);

    let resp = app
        .auth_get("/api/v1/posts/feed", &a.access_token)
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["items"].as_array().unwrap().len(), 0);

    // The record itself stays, flagged.
    let record = app
        .db
        .collection::<bson::Document>("posts")
        .find_one(bson::doc! {})
        .await
        .unwrap()
        .unwrap();
    assert!(record.get_bool("deleted").unwrap());
}

#[tokio::test]
async fn only_the_owner_deletes_a_post() {
    let app = TestApp::spawn().await;
    let a = app
        .register_user("Alice", "Anderson", "alice@backbook.test", "Password1!")
        .await;
    let b = app
        .register_user("Bobby", "Brown", "bobby@backbook.test", "Password1!")
        .await;
    let post_id = app.create_post(&a, "hands off").await;

    let resp = app
        .auth_delete(&format!("/api/v1/posts/{}", post_id), &b.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
async fn saved_posts_toggle_and_list_newest_first() {
    let app = TestApp::spawn().await;
    let a = app
        .register_user("Alice", "Anderson", "alice@backbook.test", "Password1!")
        .await;
    let first = app.create_post(&a, "first").await;
    let second = app.create_post(&a, "second").await;

    for id in [&first, &second] {
        let resp = app
            .auth_put(&format!("/api/v1/posts/{}/save", id), &a.access_token)
            .send()
            .await
            .unwrap();
        let json: Value = resp.json().await.unwrap();
        assert_eq!(json["saved"], true);
    }

    let resp = app
        .auth_get("/api/v1/posts/saved", &a.access_token)
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    let items = json.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["id"], second.as_str());
    assert_eq!(items[1]["id"], first.as_str());

    // Toggling again unsaves.
    let resp = app
        .auth_put(&format!("/api/v1/posts/{}/save", first), &a.access_token)
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["saved"], false);

    let resp = app
        .auth_get("/api/v1/posts/saved", &a.access_token)
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn profile_timeline_lists_a_users_posts() {
    let app = TestApp::spawn().await;
    let a = app
        .register_user("Alice", "Anderson", "alice@backbook.test", "Password1!")
        .await;
    let b = app
        .register_user("Bobby", "Brown", "bobby@backbook.test", "Password1!")
        .await;
    app.create_post(&a, "on my wall").await;
    app.create_post(&b, "someone else").await;

    let resp = app
        .auth_get(
            &format!("/api/v1/posts/user/{}", a.username),
            &b.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["text"], "on my wall");
}
