//! Common test utilities for E2E tests

use cliptide::{config, AppState};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server instance
    pub async fn new() -> Self {
        // Create temporary directory for test database
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        // Create test configuration
        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
                domain: "localhost".to_string(),
                protocol: "http".to_string(),
            },
            database: config::DatabaseConfig {
                path: db_path.clone(),
            },
            storage: config::StorageConfig {
                endpoint: "https://test-account.r2.cloudflarestorage.com".to_string(),
                bucket: "test-media".to_string(),
                public_url: "https://media.test.example.com".to_string(),
                access_key_id: "test-key".to_string(),
                secret_access_key: "test-secret".to_string(),
                request_timeout_seconds: 5,
            },
            auth: config::AuthConfig {
                access_token_secret: "test-access-secret-32-bytes-long!!!!".to_string(),
                refresh_token_secret: "test-refresh-secret-32-bytes-long!!!".to_string(),
                access_token_ttl: 900,
                refresh_token_ttl: 864_000,
                cookie_same_site: "lax".to_string(),
            },
            media: config::MediaConfig {
                default_avatar_url: "https://media.test.example.com/defaults/avatar.webp"
                    .to_string(),
            },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        // Initialize app state
        let state = AppState::new(config).await.unwrap();

        // Create HTTP client
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        // Build router
        let app = cliptide::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait a bit for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            addr: addr_str,
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Register a user through the API. No avatar upload.
    pub async fn register_user(&self, username: &str) -> serde_json::Value {
        let form = reqwest::multipart::Form::new()
            .text("username", username.to_string())
            .text("email", format!("{}@example.com", username))
            .text("fullName", format!("Test {}", username))
            .text("password", "password123");

        let response = self
            .client
            .post(self.url("/api/v1/users/register"))
            .multipart(form)
            .send()
            .await
            .expect("register request succeeds");
        assert_eq!(response.status(), 201, "registration should return 201");

        let body: serde_json::Value = response.json().await.expect("register response body");
        body["data"].clone()
    }

    /// Log in and return (user data, access token, refresh token).
    pub async fn login_user(&self, username: &str) -> (serde_json::Value, String, String) {
        let response = self
            .client
            .post(self.url("/api/v1/users/login"))
            .json(&serde_json::json!({
                "identifier": username,
                "password": "password123",
            }))
            .send()
            .await
            .expect("login request succeeds");
        assert_eq!(response.status(), 200, "login should return 200");

        let body: serde_json::Value = response.json().await.expect("login response body");
        let access = body["data"]["accessToken"].as_str().unwrap().to_string();
        let refresh = body["data"]["refreshToken"].as_str().unwrap().to_string();
        (body["data"]["user"].clone(), access, refresh)
    }

    /// Register + login in one step, returning (user_id, access token).
    pub async fn signup(&self, username: &str) -> (String, String) {
        self.register_user(username).await;
        let (user, access, _refresh) = self.login_user(username).await;
        (user["id"].as_str().unwrap().to_string(), access)
    }

    /// Insert a video row directly, bypassing the upload pipeline.
    pub async fn seed_video(&self, owner_id: &str, title: &str, published: bool) -> String {
        use chrono::Utc;
        use cliptide::data::{EntityId, Video};

        let id = EntityId::new().0;
        let now = Utc::now();
        let video = Video {
            id: id.clone(),
            owner_id: owner_id.to_string(),
            title: title.to_string(),
            description: format!("Description for {}", title),
            video_key: format!("videos/{}.mp4", id),
            thumbnail_key: format!("thumbnails/{}.jpg", id),
            duration_seconds: 120.0,
            views: 0,
            published,
            created_at: now,
            updated_at: now,
        };
        self.state.db.insert_video(&video).await.unwrap();
        id
    }
}
