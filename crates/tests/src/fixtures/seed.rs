use serde_json::Value;

use super::test_app::TestApp;

/// A registered user with a live access token.
pub struct SeededUser {
    pub id: String,
    pub email: String,
    pub username: String,
    pub access_token: String,
}

impl TestApp {
    /// Register a user over HTTP and return their auth info.
    pub async fn register_user(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> SeededUser {
        let resp = self
            .client
            .post(self.url("/api/v1/auth/register"))
            .json(&serde_json::json!({
                "first_name": first_name,
                "last_name": last_name,
                "email": email,
                "password": password,
                "gender": "other",
                "birth_year": 1995,
                "birth_month": 6,
                "birth_day": 15,
            }))
            .send()
            .await
            .expect("Register request failed");

        let status = resp.status().as_u16();
        let json: Value = resp.json().await.expect("Failed to parse register response");
        assert_eq!(status, 201, "Register failed: {json}");

        SeededUser {
            id: json["user"]["id"].as_str().unwrap().to_string(),
            email: email.to_string(),
            username: json["user"]["username"].as_str().unwrap().to_string(),
            access_token: json["access_token"].as_str().unwrap().to_string(),
        }
    }

    pub fn auth_get(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    pub fn auth_post(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    pub fn auth_put(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .put(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    pub fn auth_delete(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .delete(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    /// The caller's own user document.
    pub async fn me(&self, user: &SeededUser) -> Value {
        let resp = self
            .auth_get("/api/v1/auth/me", &user.access_token)
            .send()
            .await
            .expect("Me request failed");
        assert!(resp.status().is_success());
        resp.json().await.expect("Failed to parse me response")
    }

    /// Sends a friend request from `sender` to `recipient` and returns the
    /// request id from the relationship view.
    pub async fn send_friend_request(
        &self,
        sender: &SeededUser,
        recipient: &SeededUser,
    ) -> String {
        let resp = self
            .auth_put(
                &format!("/api/v1/friends/request/{}", recipient.id),
                &sender.access_token,
            )
            .send()
            .await
            .expect("Friend request failed");
        let status = resp.status().as_u16();
        let json: Value = resp.json().await.expect("Failed to parse response");
        assert_eq!(status, 200, "Friend request failed: {json}");
        json["relationship"]["request_id"]
            .as_str()
            .expect("request_id missing")
            .to_string()
    }

    /// Full friendship: request plus accept. Returns the request id.
    pub async fn befriend(&self, a: &SeededUser, b: &SeededUser) -> String {
        let request_id = self.send_friend_request(a, b).await;
        let resp = self
            .auth_put(
                &format!("/api/v1/friends/accept/{}", request_id),
                &b.access_token,
            )
            .send()
            .await
            .expect("Accept request failed");
        assert_eq!(resp.status().as_u16(), 200, "Accept failed");
        request_id
    }

    /// Creates a plain text post and returns its id.
    pub async fn create_post(&self, author: &SeededUser, text: &str) -> String {
        let resp = self
            .auth_post("/api/v1/posts", &author.access_token)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .expect("Create post failed");
        let status = resp.status().as_u16();
        let json: Value = resp.json().await.expect("Failed to parse post response");
        assert_eq!(status, 201, "Create post failed: {json}");
        json["post"]["id"].as_str().unwrap().to_string()
    }

    /// Opens (or reuses) the private chat between two users and returns its id.
    pub async fn open_chat(&self, a: &SeededUser, b: &SeededUser) -> String {
        let resp = self
            .auth_post("/api/v1/chats", &a.access_token)
            .json(&serde_json::json!({ "user_id": b.id }))
            .send()
            .await
            .expect("Open chat failed");
        let status = resp.status().as_u16();
        let json: Value = resp.json().await.expect("Failed to parse chat response");
        assert!(status == 200 || status == 201, "Open chat failed: {json}");
        json["id"].as_str().unwrap().to_string()
    }
}
