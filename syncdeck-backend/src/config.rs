use std::env;

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    /// OAuth client credentials for the external workspace API. Connect
    /// routes answer 503 while these are unset.
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub authorize_url: String,
    pub token_url: String,
    pub seed_demo_data: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .expect("PORT must be a valid number");

        Self {
            port,
            client_id: env::var("WORKSPACE_CLIENT_ID").ok(),
            client_secret: env::var("WORKSPACE_CLIENT_SECRET").ok(),
            redirect_uri: env::var("WORKSPACE_REDIRECT_URI")
                .unwrap_or_else(|_| format!("http://localhost:{}/auth/external/callback", port)),
            authorize_url: env::var("WORKSPACE_AUTHORIZE_URL")
                .unwrap_or_else(|_| "https://api.notion.com/v1/oauth/authorize".to_string()),
            token_url: env::var("WORKSPACE_TOKEN_URL")
                .unwrap_or_else(|_| "https://api.notion.com/v1/oauth/token".to_string()),
            seed_demo_data: env::var("SEED_DEMO_DATA")
                .map(|v| v == "1" || v.to_lowercase() == "true")
                .unwrap_or(false),
        }
    }
}
