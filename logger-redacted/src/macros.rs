// Logging macros that scrub the formatted message before emitting it
#[macro_export]
macro_rules! redacted_warn {
    ($redactor:expr, $($arg:tt)*) => {
        $crate::tracing::warn!("{}", $redactor.redact(&format!($($arg)*)))
    };
}

#[macro_export]
macro_rules! redacted_error {
    ($redactor:expr, $($arg:tt)*) => {
        $crate::tracing::error!("{}", $redactor.redact(&format!($($arg)*)))
    };
}
