use serde::Serialize;
use crate::domain::{ProbeError, SensorRecord};
use crate::ports::Renderer;

const EXPIRY_CHANNEL: &str = "Certificate expiration";
const PLACEHOLDER_CHANNEL: &str = "Placeholder";

#[derive(Serialize)]
struct PrtgDocument<'a> {
    prtg: PrtgBody<'a>,
}

#[derive(Serialize)]
struct PrtgBody<'a> {
    result: [PrtgChannel; 2],
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct PrtgChannel {
    channel: &'static str,
    value: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom_unit: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    float: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit_min_warning: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit_min_error: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit_mode: Option<u8>,
}

impl PrtgChannel {
    fn expiry(record: &SensorRecord) -> Self {
        Self {
            channel: EXPIRY_CHANNEL,
            value: record.days_remaining,
            unit: Some("Custom"),
            custom_unit: Some("Days"),
            float: Some(0),
            limit_min_warning: Some(record.thresholds.warning_days),
            limit_min_error: Some(record.thresholds.error_days),
            limit_mode: Some(1),
        }
    }

    // PRTG wants more than one channel in an advanced sensor result.
    fn placeholder() -> Self {
        Self {
            channel: PLACEHOLDER_CHANNEL,
            value: 0,
            unit: None,
            custom_unit: None,
            float: None,
            limit_min_warning: None,
            limit_min_error: None,
            limit_mode: None,
        }
    }
}

/// PRTG "EXE/Script Advanced" JSON.
pub struct PrtgJsonRenderer;

impl PrtgJsonRenderer {
    pub fn new() -> Self { Self }
}

impl Default for PrtgJsonRenderer {
    fn default() -> Self { Self::new() }
}

impl Renderer for PrtgJsonRenderer {
    fn render(&self, record: &SensorRecord) -> Result<String, ProbeError> {
        let doc = PrtgDocument {
            prtg: PrtgBody {
                result: [PrtgChannel::expiry(record), PrtgChannel::placeholder()],
                text: &record.text,
            },
        };
        serde_json::to_string_pretty(&doc).map_err(|e| ProbeError::output(format!("failed to serialise sensor result: {}", e)))
    }
}

/// Legacy PRTG "EXE/Script" output: `value:message`.
pub struct PrtgTextRenderer;

impl PrtgTextRenderer {
    pub fn new() -> Self { Self }
}

impl Default for PrtgTextRenderer {
    fn default() -> Self { Self::new() }
}

impl Renderer for PrtgTextRenderer {
    fn render(&self, record: &SensorRecord) -> Result<String, ProbeError> {
        Ok(format!("{}:{}", record.days_remaining, record.text.replace(['\r', '\n'], " ")))
    }
}
