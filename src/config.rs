use dotenvy;

#[derive(Debug)]
pub struct AppConfig {
    pub db_namespace: String,
    pub db_database: String,
    pub db_password: Option<String>,
    pub db_username: Option<String>,
    pub db_url: String,
    pub matrix_url: String,
    pub matrix_server_name: String,
    pub matrix_access_token: String,
    pub matrix_request_timeout_secs: u64,
    pub is_development: bool,
    pub sentry_project_link: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let db_namespace = std::env::var("DB_NAMESPACE").unwrap_or("namespace".to_string());
        let db_database = std::env::var("DB_DATABASE").unwrap_or("database".to_string());
        let db_password = std::env::var("DB_PASSWORD").ok();
        let db_username = std::env::var("DB_USERNAME").ok();
        let db_url = std::env::var("DB_URL").expect("Missing DB_URL in env");

        let matrix_url = std::env::var("MATRIX_URL").expect("Missing MATRIX_URL in env");
        let matrix_server_name =
            std::env::var("MATRIX_SERVER_NAME").expect("Missing MATRIX_SERVER_NAME in env");
        let matrix_access_token =
            std::env::var("MATRIX_ACCESS_TOKEN").expect("Missing MATRIX_ACCESS_TOKEN in env");
        let matrix_request_timeout_secs = std::env::var("MATRIX_REQUEST_TIMEOUT_SECS")
            .unwrap_or("10".to_string())
            .parse()
            .expect("MATRIX_REQUEST_TIMEOUT_SECS should be number");

        let is_development = std::env::var("DEVELOPMENT")
            .expect("set DEVELOPMENT env var")
            .eq("true");

        let sentry_project_link = std::env::var("SENTRY_PROJECT_LINK").ok();

        Self {
            db_namespace,
            db_database,
            db_password,
            db_username,
            db_url,
            matrix_url,
            matrix_server_name,
            matrix_access_token,
            matrix_request_timeout_secs,
            is_development,
            sentry_project_link,
        }
    }
}
