/// Service configuration read from environment variables, with defaults
/// suitable for local development against a sidecar Ollama instance
#[derive(Debug, Clone)]
pub struct Config {
    /// Primary completion provider: "ollama" or "together"
    pub llm_provider: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub together_api_url: String,
    pub together_model: String,
    pub together_api_key: Option<String>,
    /// When true, the non-primary provider is appended to the chain
    pub enable_fallback: bool,
    pub port: u16,
    pub catalog_path: String,
    pub reviews_path: String,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            llm_provider: env_or("LLM_PROVIDER", "ollama"),
            ollama_url: env_or("OLLAMA_URL", "http://localhost:11434"),
            ollama_model: env_or("OLLAMA_MODEL", "llama3.2"),
            together_api_url: env_or(
                "TOGETHER_API_URL",
                "https://api.together.xyz/v1/completions",
            ),
            together_model: env_or("TOGETHER_MODEL", "mistralai/Mistral-7B-Instruct-v0.1"),
            together_api_key: std::env::var("TOGETHER_API_KEY").ok(),
            enable_fallback: std::env::var("ENABLE_FALLBACK")
                .map(|v| v == "true")
                .unwrap_or(false),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            catalog_path: env_or("CATALOG_PATH", "data/movies.json"),
            reviews_path: env_or("REVIEWS_PATH", "data/reviews.json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_or_falls_back_to_default() {
        assert_eq!(
            env_or("MOVIE_REC_TEST_UNSET_VARIABLE", "fallback"),
            "fallback"
        );
    }

    #[test]
    fn defaults_target_local_ollama() {
        // Relies on the test environment not overriding these variables
        let config = Config::from_env();
        assert_eq!(config.llm_provider, "ollama");
        assert_eq!(config.ollama_url, "http://localhost:11434");
        assert_eq!(config.port, 3000);
    }
}
