use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    pub api_prefix: String,

    /// Bound on the registered-location catalog lookup.
    pub lookup_timeout_ms: u64,

    /// Sane year bounds for monthly exports.
    pub export_min_year: i32,
    pub export_max_year: i32,

    // Rate limiting
    pub rate_write_per_min: u32,
    pub rate_protected_per_min: u32,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".to_string()),
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            lookup_timeout_ms: env::var("LOOKUP_TIMEOUT_MS")
                .unwrap_or_else(|_| "2000".to_string())
                .parse()
                .unwrap(),

            export_min_year: env::var("EXPORT_MIN_YEAR")
                .unwrap_or_else(|_| "2000".to_string())
                .parse()
                .unwrap(),
            export_max_year: env::var("EXPORT_MAX_YEAR")
                .unwrap_or_else(|_| "2100".to_string())
                .parse()
                .unwrap(),

            rate_write_per_min: env::var("RATE_WRITE_PER_MIN")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap(),
            rate_protected_per_min: env::var("RATE_PROTECTED_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap(),
        }
    }

    pub fn year_bounds(&self) -> (i32, i32) {
        (self.export_min_year, self.export_max_year)
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            server_addr: "127.0.0.1:0".to_string(),
            api_prefix: "/api".to_string(),
            lookup_timeout_ms: 250,
            export_min_year: 2000,
            export_max_year: 2100,
            rate_write_per_min: 10_000,
            rate_protected_per_min: 10_000,
        }
    }
}
