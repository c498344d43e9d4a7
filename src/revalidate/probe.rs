use reqwest::StatusCode;

use crate::fetcher::FetchError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Alive(StatusCode),
    Dead(String),
}

impl ProbeOutcome {
    pub fn classify(result: Result<StatusCode, FetchError>) -> Self {
        match result {
            Ok(status) if status.as_u16() < 400 => Self::Alive(status),
            Ok(status) => Self::Dead(format!("http status {}", status.as_u16())),
            Err(e) => Self::Dead(e.to_string()),
        }
    }

    pub fn is_alive(&self) -> bool {
        matches!(self, Self::Alive(_))
    }
}
