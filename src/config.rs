use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub session_file: PathBuf,
    pub page_size: usize,
    pub timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            api_base_url: env::var("ROSTER_API_URL")
                .unwrap_or_else(|_| "http://localhost:8080/api".into())
                .trim_end_matches('/')
                .to_string(),
            session_file: match env::var("ROSTER_SESSION_FILE") {
                Ok(path) => PathBuf::from(path),
                Err(_) => default_session_file(),
            },
            page_size: env::var("ROSTER_PAGE_SIZE")
                .unwrap_or_else(|_| "10".into())
                .parse()?,
            timeout_secs: env::var("ROSTER_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".into())
                .parse()?,
        })
    }
}

fn default_session_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rosterctl")
        .join("session.json")
}
