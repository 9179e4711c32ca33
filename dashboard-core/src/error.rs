use thiserror::Error;

/// Failure taxonomy for one fetch cycle.
///
/// The `Display` strings are exactly what the presentation layer shows, so
/// they stay short and actionable. Details that would read like a stack
/// trace (the `Unexpected` payload) are kept on the variant for logging but
/// left out of the message.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Credential rejected by the remote service (HTTP 401).
    #[error("Authentication failed. Check your API key.")]
    Unauthorized,

    /// The location string did not resolve to a known place (HTTP 404).
    #[error("City not found: \"{0}\". Please check spelling.")]
    NotFound(String),

    /// Remote service reported a 5xx-class failure.
    #[error("Server error ({0}). Please try again later.")]
    ServerError(u16),

    /// Any other non-2xx response; the message comes from the error body.
    #[error("Error {status}: {message}")]
    ClientError { status: u16, message: String },

    /// No response within the request deadline.
    #[error("Request timed out.")]
    Timeout,

    /// The request could not be sent or received at all.
    #[error("Network error. Could not reach weather service. Check connection.")]
    NetworkUnreachable,

    /// Malformed response or any other unclassified failure.
    #[error("An unexpected error occurred.")]
    Unexpected(String),

    /// No API credential is configured; detected before any network call.
    #[error("Weather service is not configured. Missing API key.")]
    NotConfigured,

    /// Startup could not resolve durable storage; the app stays usable.
    #[error("Failed to initialize application. Search history and preferences will not persist.")]
    InitializationFailure,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_query() {
        let err = WeatherError::NotFound("Nonexistentville".to_string());
        assert!(err.to_string().contains("Nonexistentville"));
    }

    #[test]
    fn unexpected_detail_stays_out_of_the_message() {
        let err = WeatherError::Unexpected("expected value at line 1".to_string());
        assert_eq!(err.to_string(), "An unexpected error occurred.");
    }

    #[test]
    fn client_error_carries_the_body_message() {
        let err = WeatherError::ClientError {
            status: 429,
            message: "Your account is temporarily blocked".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Error 429: Your account is temporarily blocked"
        );
    }
}
