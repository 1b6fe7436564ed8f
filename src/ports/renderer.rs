use crate::domain::{ProbeError, SensorRecord};

pub trait Renderer: Send + Sync {
    fn render(&self, record: &SensorRecord) -> Result<String, ProbeError>;
}
