//! Default values used across the codebase

/// Outbound model API defaults
pub mod llm {
    /// OpenAI-compatible chat completions base URL
    pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

    pub const DEFAULT_MODEL: &str = "gpt-4o";

    pub const DEFAULT_TEMPERATURE: f32 = 0.7;

    /// Upper bound on a single model call
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
}

/// HTTP server defaults
pub mod server {
    pub const DEFAULT_HOST: &str = "0.0.0.0";

    pub const DEFAULT_PORT: u16 = 8000;

    pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

    pub const DEFAULT_CORS_ORIGINS: &[&str] = &[
        "http://localhost",
        "http://localhost:3000",
        "https://dogy-assistent.vercel.app/assistant",
    ];
}

/// Per-client rate limit on the chat endpoint (20 per minute)
pub mod rate_limit {
    pub const DEFAULT_MAX_REQUESTS: u32 = 20;

    pub const DEFAULT_WINDOW_SECS: u64 = 60;
}

/// Product catalog defaults
pub mod catalog {
    pub const DEFAULT_PATH: &str = "product_data.json";

    /// Suggestions returned per request when matching includes descriptions
    pub const DEFAULT_MAX_RESULTS: usize = 5;
}
