use serde::Deserialize;

#[derive(Deserialize, Debug, Default, Clone)]
pub struct RawUsage {
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
    pub cache_creation_input_tokens: Option<u64>,
    pub cache_read_input_tokens: Option<u64>,
}

impl RawUsage {
    /// True when no token field was present at all (`"usage": {}`)
    pub fn is_empty(&self) -> bool {
        self.input_tokens.is_none()
            && self.output_tokens.is_none()
            && self.cache_creation_input_tokens.is_none()
            && self.cache_read_input_tokens.is_none()
    }
}

#[derive(Deserialize, Debug)]
pub struct RawMessage {
    pub id: Option<String>,
    pub model: Option<String>,
    pub usage: Option<RawUsage>,
}

/// Shape of one line in a usage log. Unknown fields are ignored.
#[derive(Deserialize, Debug)]
pub struct RawUsageLine {
    pub timestamp: Option<String>,
    pub usage: Option<RawUsage>,
    pub message: Option<RawMessage>,
    pub model: Option<String>,
    pub message_id: Option<String>,
    #[serde(rename = "messageId")]
    pub message_id_camel: Option<String>,
    pub request_id: Option<String>,
    #[serde(rename = "requestId")]
    pub request_id_camel: Option<String>,
    pub cost: Option<f64>,
    #[serde(rename = "costUSD")]
    pub cost_usd: Option<f64>,
}
