use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use super::setup::{TestSetup, TestUser};

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    /// Send a request through the router and decode the JSON body, if any
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    pub async fn register(&self, display_name: &str) -> TestUser {
        let (status, body) = self
            .send(
                "POST",
                "/users",
                None,
                Some(json!({ "display_name": display_name })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "register failed: {}", body);
        TestUser {
            id: body["user"]["id"].as_str().unwrap().to_string(),
            token: body["token"].as_str().unwrap().to_string(),
        }
    }

    pub async fn create_guest(&self, display_name: Option<&str>) -> String {
        let (status, body) = self
            .send(
                "POST",
                "/guests",
                None,
                Some(json!({ "display_name": display_name })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "guest creation failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }

    /// Creates a group owned by `admin` with every user in `members` added
    pub async fn create_group(
        &self,
        admin: &TestUser,
        name: &str,
        members: &[&TestUser],
    ) -> String {
        let (status, body) = self
            .send(
                "POST",
                "/groups",
                Some(&admin.token),
                Some(json!({ "name": name })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "group creation failed: {}", body);
        let group_id = body["id"].as_str().unwrap().to_string();

        for member in members {
            let (status, body) = self.add_member(admin, &group_id, &member.id).await;
            assert_eq!(status, StatusCode::OK, "add member failed: {}", body);
        }
        group_id
    }

    pub async fn add_member(
        &self,
        actor: &TestUser,
        group_id: &str,
        user_id: &str,
    ) -> (StatusCode, Value) {
        self.send(
            "POST",
            &format!("/groups/{}/members", group_id),
            Some(&actor.token),
            Some(json!({ "user_id": user_id })),
        )
        .await
    }

    pub async fn create_game(&self, actor: &TestUser, name: &str) -> String {
        let (status, body) = self
            .send("POST", "/games", Some(&actor.token), Some(json!({ "name": name })))
            .await;
        assert_eq!(status, StatusCode::OK, "game creation failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn create_template(
        &self,
        actor: &TestUser,
        game_id: &str,
        fields: &[&str],
    ) -> String {
        let fields: Vec<Value> = fields
            .iter()
            .map(|key| json!({ "key": key, "label": key.to_uppercase() }))
            .collect();
        let (status, body) = self
            .send(
                "POST",
                &format!("/games/{}/templates", game_id),
                Some(&actor.token),
                Some(json!({ "name": "Scorecard", "fields": fields })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "template creation failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn record_session(
        &self,
        actor: &TestUser,
        group_id: &str,
        body: Value,
    ) -> (StatusCode, Value) {
        self.send(
            "POST",
            &format!("/groups/{}/sessions", group_id),
            Some(&actor.token),
            Some(body),
        )
        .await
    }

    /// Records a session from raw scores, panicking if it is rejected
    pub async fn play<S: AsRef<str>>(
        &self,
        actor: &TestUser,
        group_id: &str,
        game_id: &str,
        scores: &[(S, i32)],
    ) -> Value {
        let players: Vec<Value> = scores
            .iter()
            .map(|(user_id, score)| json!({ "user_id": user_id.as_ref(), "raw_score": score }))
            .collect();
        let (status, body) = self
            .record_session(
                actor,
                group_id,
                json!({ "game_id": game_id, "players": players }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "session rejected: {}", body);
        body
    }

    pub async fn leaderboard(&self, group_id: &str) -> (StatusCode, Value) {
        self.send("GET", &format!("/groups/{}/leaderboard", group_id), None, None)
            .await
    }

    pub async fn statistics(&self, user_id: &str) -> (StatusCode, Value) {
        self.send("GET", &format!("/users/{}/statistics", user_id), None, None)
            .await
    }
}
