use serde::Deserialize;

/// Canonical response envelope: `{ success, message?, data?, error? }`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    // Missing Option fields already decode as None; a `default` attribute here
    // would make serde demand `T: Default`.
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Best human-readable message the server gave, error first
    pub fn reason(&self) -> Option<&str> {
        let present = |m: &&str| !m.trim().is_empty();
        self.error
            .as_deref()
            .filter(present)
            .or(self.message.as_deref().filter(present))
    }

    /// `Ok(data)` for a successful envelope carrying data, otherwise the server's reason
    pub fn into_data(self) -> Result<T, String> {
        let reason = self.reason().unwrap_or("Request failed").to_string();
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err("Response contained no data".to_string()),
            (false, _) => Err(reason),
        }
    }
}
