#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub port: u16,
    pub llm_url: String,
    pub llm_api_key: String,
    pub model_name: String,
    pub allowed_origins: Vec<String>,
    pub auth_admin_url: Option<String>,
    pub auth_service_key: Option<String>,
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let jwt_secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set");
        let llm_api_key = std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY must be set");
        let llm_url =
            std::env::var("LLM_URL").unwrap_or_else(|_| "https://api.openai.com".to_string());
        let model_name =
            std::env::var("MODEL_NAME").unwrap_or_else(|_| "gpt-4-turbo-preview".to_string());
        let allowed_origins = parse_allowed_origins(
            &std::env::var("ALLOWED_ORIGINS").unwrap_or_default(),
        );
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8000);

        Config {
            database_url,
            jwt_secret,
            port,
            llm_url,
            llm_api_key,
            model_name,
            allowed_origins,
            auth_admin_url: non_empty_var("AUTH_ADMIN_URL"),
            auth_service_key: non_empty_var("AUTH_SERVICE_KEY"),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Split the comma-separated ALLOWED_ORIGINS value. Origins are compared
/// verbatim against the request's `Origin` header, so only surrounding
/// whitespace is stripped.
pub fn parse_allowed_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_trims_origins() {
        assert_eq!(
            parse_allowed_origins("https://aichief.com, http://localhost:3000,,"),
            vec!["https://aichief.com", "http://localhost:3000"]
        );
    }

    #[test]
    fn empty_value_allows_nothing() {
        assert!(parse_allowed_origins("").is_empty());
        assert!(parse_allowed_origins(" , ").is_empty());
    }
}
