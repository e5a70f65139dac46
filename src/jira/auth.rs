use base64::Engine as _;

pub struct JiraAuth {
    header: String,
}

impl JiraAuth {
    pub fn new(email: &str, api_token: &str) -> Self {
        let raw = format!("{}:{}", email, api_token);
        let encoded = base64::engine::general_purpose::STANDARD.encode(raw.as_bytes());
        Self {
            header: format!("Basic {}", encoded),
        }
    }

    /// Build auth headers for a request.
    pub fn headers(&self) -> Vec<(String, String)> {
        vec![("Authorization".to_string(), self.header.clone())]
    }
}
