mod config;
mod selector;
mod probe;

pub use config::{parse_date, parse_duration, split_template_list, ProbeConfig, SelectionParams, DEFAULT_MAX_RESULTS, DEFAULT_TIMEOUT};
pub use selector::{ExpirySelector, Selection};
pub use probe::CheckExpiryUseCase;
