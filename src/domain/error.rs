use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Input,
    Ca,
    Directory,
    Timeout,
    Output,
    Other,
}

impl ErrorClass {
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorClass::Input => 2,
            ErrorClass::Ca => 3,
            ErrorClass::Directory => 4,
            ErrorClass::Timeout => 5,
            ErrorClass::Output => 6,
            ErrorClass::Other => 1,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            ErrorClass::Input => "INPUT",
            ErrorClass::Ca => "CA",
            ErrorClass::Directory => "DIRECTORY",
            ErrorClass::Timeout => "TIMEOUT",
            ErrorClass::Output => "OUTPUT",
            ErrorClass::Other => "ERROR",
        }
    }
}

/// Failure of a probe invocation. Missing data is never one of these:
/// an empty enumeration still yields a payload.
#[derive(Debug, Error)]
#[error("error[{}]: {}", .class.tag(), .message)]
pub struct ProbeError {
    pub class: ErrorClass,
    pub message: String,
}

impl ProbeError {
    pub fn new(class: ErrorClass, message: impl Into<String>) -> Self {
        Self { class, message: message.into() }
    }

    pub fn input(msg: impl Into<String>) -> Self { Self::new(ErrorClass::Input, msg) }
    pub fn ca(msg: impl Into<String>) -> Self { Self::new(ErrorClass::Ca, msg) }
    pub fn directory(msg: impl Into<String>) -> Self { Self::new(ErrorClass::Directory, msg) }
    pub fn timeout(msg: impl Into<String>) -> Self { Self::new(ErrorClass::Timeout, msg) }
    pub fn output(msg: impl Into<String>) -> Self { Self::new(ErrorClass::Output, msg) }
    pub fn other(msg: impl Into<String>) -> Self { Self::new(ErrorClass::Other, msg) }

    pub fn exit_code(&self) -> u8 {
        self.class.exit_code() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_class_tag() {
        let err = ProbeError::ca("certutil exited with status 1");
        assert_eq!(err.to_string(), "error[CA]: certutil exited with status 1");
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn input_errors_exit_like_usage_errors() {
        assert_eq!(ProbeError::input("x").exit_code(), 2);
        assert_eq!(ProbeError::other("x").exit_code(), 1);
    }
}
