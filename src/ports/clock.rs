use std::time::Duration;
use chrono::{DateTime, Utc};
use crate::domain::ProbeError;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn timeout<F, T>(&self, duration: Duration, future: F) -> impl std::future::Future<Output = Result<T, ProbeError>> + Send
    where
        F: std::future::Future<Output = T> + Send,
        T: Send;
}
