use clioraops_core::Error;

/// Whether a failed generation is worth offering to the user again.
///
/// Nothing retries automatically; callers use this to label a rejection.
pub fn is_retryable_error(error: &Error) -> bool {
    match error {
        Error::Provider(msg) => is_retryable_message(msg),
        Error::Io(_) => true,
        _ => false,
    }
}

/// Same classification applied to an error already rendered as text
pub fn is_retryable_message(msg: &str) -> bool {
    let msg_lower = msg.to_lowercase();
    msg_lower.contains("timeout")
        || msg_lower.contains("timed out")
        || msg_lower.contains("network")
        || msg_lower.contains("connection")
        || msg_lower.contains("429")
        || msg_lower.contains("rate limit")
        || msg_lower.contains("temporar")
        || msg_lower.contains("503")
}
