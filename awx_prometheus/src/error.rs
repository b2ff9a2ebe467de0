use log::{debug, warn};

/// Logs an error; its chain of causes is only logged at the debug level.
pub fn debug_error(err: &anyhow::Error) {
    warn!("{}", err);
    for cause in err.chain().skip(1) {
        debug!("Caused by: {}", cause);
    }
}

/// Renders an error and all of its causes on one line, e.g. for the final exit message.
pub fn error_chain(err: &anyhow::Error) -> String {
    err.chain()
        .map(|cause| cause.to_string())
        .collect::<Vec<_>>()
        .join(": ")
}
