use std::env;

/// Hard ceiling on any listing endpoint.
pub const MAX_PAGE_SIZE: i64 = 200;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub broadcast_window_minutes: i64,
    pub page_size: i64,
    pub normalize_dates: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "travel_intake.db".to_string()),
            broadcast_window_minutes: env::var("BROADCAST_WINDOW_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|m: &i64| *m > 0)
                .unwrap_or(10),
            page_size: env::var("PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(MAX_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
            normalize_dates: env::var("NORMALIZE_DATES")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }

    pub fn broadcast_window(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.broadcast_window_minutes)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            database_url: ":memory:".to_string(),
            broadcast_window_minutes: 10,
            page_size: MAX_PAGE_SIZE,
            normalize_dates: false,
        }
    }
}
