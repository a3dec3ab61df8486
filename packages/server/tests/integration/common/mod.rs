use std::net::SocketAddr;

use reqwest::{Client, Method};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use tempfile::TempDir;

use judging_server::config::{
    AppConfig, AuthConfig, CorsConfig, DatabaseConfig, JudgingConfig, LimitsConfig, ServerConfig,
};
use judging_server::state::AppState;
use judging_server::utils::jwt;

pub const JWT_SECRET: &str = "test-secret-for-integration-tests";

pub const ORGANIZER_ID: i32 = 1;

pub mod routes {
    pub const HACKATHONS: &str = "/api/v1/hackathons";

    pub fn hackathon(id: i32) -> String {
        format!("/api/v1/hackathons/{id}")
    }

    pub fn phase(id: i32) -> String {
        format!("/api/v1/hackathons/{id}/phase")
    }

    pub fn progress(id: i32) -> String {
        format!("/api/v1/hackathons/{id}/progress")
    }

    pub fn publish(id: i32) -> String {
        format!("/api/v1/hackathons/{id}/publish")
    }

    pub fn leaderboard(id: i32) -> String {
        format!("/api/v1/hackathons/{id}/leaderboard")
    }

    pub fn criteria(id: i32) -> String {
        format!("/api/v1/hackathons/{id}/criteria")
    }

    pub fn criterion(id: i32, criterion_id: i32) -> String {
        format!("/api/v1/hackathons/{id}/criteria/{criterion_id}")
    }

    pub fn criteria_reorder(id: i32) -> String {
        format!("/api/v1/hackathons/{id}/criteria/reorder")
    }

    pub fn judges(id: i32) -> String {
        format!("/api/v1/hackathons/{id}/judges")
    }

    pub fn judge(id: i32, user_id: i32) -> String {
        format!("/api/v1/hackathons/{id}/judges/{user_id}")
    }

    pub fn judges_accept(id: i32) -> String {
        format!("/api/v1/hackathons/{id}/judges/accept")
    }

    pub fn teams(id: i32) -> String {
        format!("/api/v1/hackathons/{id}/teams")
    }

    pub fn team_join(id: i32, team_id: i32) -> String {
        format!("/api/v1/hackathons/{id}/teams/{team_id}/join")
    }

    pub fn hackathon_submissions(id: i32) -> String {
        format!("/api/v1/hackathons/{id}/submissions")
    }

    pub fn submission(id: i32) -> String {
        format!("/api/v1/submissions/{id}")
    }

    pub fn submission_status(id: i32) -> String {
        format!("/api/v1/submissions/{id}/status")
    }

    pub fn scores(id: i32) -> String {
        format!("/api/v1/submissions/{id}/scores")
    }
}

/// A running test server backed by its own SQLite file.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    _dir: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

/// A hackathon in `judging` with submissions and one accepted judge.
pub struct JudgingSetup {
    pub hackathon_id: i32,
    pub organizer: String,
    pub judge: String,
    pub submission_ids: Vec<i32>,
    /// Criterion IDs in display order.
    pub criterion_ids: Vec<i32>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_limits(LimitsConfig::default()).await
    }

    pub async fn spawn_with_limits(limits: LimitsConfig) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());

        let db = judging_server::database::init_db(&db_url)
            .await
            .expect("Failed to initialize test database");

        let app_config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig {
                    allow_origins: vec![],
                    max_age: 3600,
                },
            },
            database: DatabaseConfig { url: db_url },
            auth: AuthConfig {
                jwt_secret: JWT_SECRET.to_string(),
            },
            judging: JudgingConfig::default(),
            limits,
        };

        let state = AppState {
            db: db.clone(),
            config: app_config,
        };

        let app = judging_server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            _dir: dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Mint a bearer token the way the external auth service would.
    pub fn token(&self, user_id: i32, username: &str, role: &str) -> String {
        jwt::sign(JWT_SECRET, user_id, username, role, chrono::Duration::hours(1))
            .expect("Failed to sign token")
    }

    pub fn organizer_token(&self) -> String {
        self.token(ORGANIZER_ID, "organizer", "organizer")
    }

    pub fn participant_token(&self, user_id: i32) -> String {
        self.token(user_id, &format!("participant{user_id}"), "participant")
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut req = self.client.request(method.clone(), self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        let res = req
            .send()
            .await
            .unwrap_or_else(|e| panic!("{method} {path} failed to send: {e}"));
        TestResponse::from_response(res).await
    }

    pub async fn post_with_token(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        self.send(Method::POST, path, Some(body), Some(token)).await
    }

    pub async fn post_without_token(&self, path: &str, body: &Value) -> TestResponse {
        self.send(Method::POST, path, Some(body), None).await
    }

    pub async fn get_with_token(&self, path: &str, token: &str) -> TestResponse {
        self.send(Method::GET, path, None, Some(token)).await
    }

    pub async fn patch_with_token(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        self.send(Method::PATCH, path, Some(body), Some(token)).await
    }

    pub async fn put_with_token(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        self.send(Method::PUT, path, Some(body), Some(token)).await
    }

    pub async fn delete_with_token(&self, path: &str, token: &str) -> TestResponse {
        self.send(Method::DELETE, path, None, Some(token)).await
    }

    /// Create a hackathon with the given criteria and return its `id`.
    pub async fn create_hackathon(&self, token: &str, title: &str, criteria: Value) -> i32 {
        let res = self
            .post_with_token(
                routes::HACKATHONS,
                &json!({
                    "title": title,
                    "description": "Build something **great**.",
                    "judging_criteria": criteria,
                }),
                token,
            )
            .await;
        assert_eq!(res.status, 201, "create_hackathon failed: {}", res.text);
        res.id()
    }

    pub async fn set_status(&self, token: &str, hackathon_id: i32, status: &str) {
        let res = self
            .patch_with_token(
                &routes::hackathon(hackathon_id),
                &json!({ "status": status }),
                token,
            )
            .await;
        assert_eq!(res.status, 200, "set_status({status}) failed: {}", res.text);
    }

    /// Invite a judge, accept the invitation, and return the judge's token.
    pub async fn add_judge(&self, organizer: &str, hackathon_id: i32, user_id: i32) -> String {
        let username = format!("judge{user_id}");
        let res = self
            .post_with_token(
                &routes::judges(hackathon_id),
                &json!({ "user_id": user_id, "username": username }),
                organizer,
            )
            .await;
        assert_eq!(res.status, 201, "invite judge failed: {}", res.text);

        let token = self.token(user_id, &username, "judge");
        let res = self
            .post_with_token(&routes::judges_accept(hackathon_id), &json!({}), &token)
            .await;
        assert_eq!(res.status, 200, "accept invitation failed: {}", res.text);
        token
    }

    /// Create a team as `token`'s user and return its `id`.
    pub async fn create_team(&self, token: &str, hackathon_id: i32, name: &str) -> i32 {
        let res = self
            .post_with_token(&routes::teams(hackathon_id), &json!({ "name": name }), token)
            .await;
        assert_eq!(res.status, 201, "create_team failed: {}", res.text);
        res.id()
    }

    /// Submit a project for a team and return the submission `id`.
    pub async fn create_submission(
        &self,
        token: &str,
        hackathon_id: i32,
        team_id: i32,
        project_name: &str,
        track: &str,
    ) -> i32 {
        let res = self
            .post_with_token(
                &routes::hackathon_submissions(hackathon_id),
                &json!({
                    "team_id": team_id,
                    "project_name": project_name,
                    "description": "What we built.",
                    "track": track,
                }),
                token,
            )
            .await;
        assert_eq!(res.status, 201, "create_submission failed: {}", res.text);
        res.id()
    }

    /// One team (and submission) per participant, entered during `hacking`.
    pub async fn seed_submissions(
        &self,
        organizer: &str,
        hackathon_id: i32,
        tracks: &[&str],
    ) -> Vec<i32> {
        self.set_status(organizer, hackathon_id, "hacking").await;
        let mut ids = Vec::with_capacity(tracks.len());
        for (i, track) in tracks.iter().enumerate() {
            let user_id = 100 + i as i32;
            let token = self.participant_token(user_id);
            let team_id = self
                .create_team(&token, hackathon_id, &format!("Team {i}"))
                .await;
            let project = format!("Project {i}");
            ids.push(
                self.create_submission(&token, hackathon_id, team_id, &project, track)
                    .await,
            );
        }
        ids
    }

    /// A hackathon in `judging` with one accepted judge and a submission per track.
    pub async fn judging_setup(&self, criteria: Value, tracks: &[&str]) -> JudgingSetup {
        let organizer = self.organizer_token();
        let hackathon_id = self
            .create_hackathon(&organizer, "Judging Hackathon", criteria)
            .await;
        let submission_ids = self
            .seed_submissions(&organizer, hackathon_id, tracks)
            .await;
        self.set_status(&organizer, hackathon_id, "judging").await;
        let judge = self.add_judge(&organizer, hackathon_id, 10).await;

        let res = self
            .get_with_token(&routes::criteria(hackathon_id), &organizer)
            .await;
        assert_eq!(res.status, 200, "list criteria failed: {}", res.text);
        let criterion_ids = res
            .body
            .as_array()
            .expect("criteria should be an array")
            .iter()
            .map(|c| c["id"].as_i64().unwrap() as i32)
            .collect();

        JudgingSetup {
            hackathon_id,
            organizer,
            judge,
            submission_ids,
            criterion_ids,
        }
    }

    /// Submit a fresh review scoring the criteria in order.
    pub async fn score(
        &self,
        judge: &str,
        submission_id: i32,
        criterion_ids: &[i32],
        scores: &[f64],
    ) -> TestResponse {
        let criteria: Vec<Value> = criterion_ids
            .iter()
            .zip(scores)
            .map(|(id, score)| json!({ "criterion_id": id, "score": score }))
            .collect();
        self.post_with_token(
            &routes::scores(submission_id),
            &json!({ "criteria": criteria, "flagged": false }),
            judge,
        )
        .await
    }
}

/// Four equally weighted criteria scored out of 10.
pub fn four_even_criteria() -> Value {
    json!([
        { "name": "Innovation", "weight": 25, "max_score": 10 },
        { "name": "Technical", "weight": 25, "max_score": 10 },
        { "name": "Design", "weight": 25, "max_score": 10 },
        { "name": "Impact", "weight": 25, "max_score": 10 },
    ])
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }

    pub fn id(&self) -> i32 {
        self.body["id"]
            .as_i64()
            .unwrap_or_else(|| panic!("Response should contain an id: {}", self.text))
            as i32
    }
}
