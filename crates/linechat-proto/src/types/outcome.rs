//! Structured results handed back to callers.

/// Result of one session operation that reached the server.
///
/// `success == false` means the server answered but refused the request;
/// `message` then carries its reply verbatim for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<T = ()> {
    /// True if the server acknowledged the request.
    pub success: bool,
    /// Text to show the user.
    pub message: String,
    /// Payload of a successful request, if the operation returns one.
    pub data: Option<T>,
}

impl<T> Outcome<T> {
    /// A successful outcome carrying `data`.
    #[must_use]
    pub fn accepted(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    /// A refused request; `message` is the server's reply.
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }

    /// Returns the payload, if any.
    #[must_use]
    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

impl Outcome<()> {
    /// A successful outcome with no payload.
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self::accepted(message, ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_carries_data() {
        let outcome = Outcome::accepted("2 messages", vec!["a", "b"]);
        assert!(outcome.success);
        assert_eq!(outcome.into_data(), Some(vec!["a", "b"]));
    }

    #[test]
    fn rejected_has_no_data() {
        let outcome: Outcome<Vec<String>> = Outcome::rejected("username taken");
        assert!(!outcome.success);
        assert_eq!(outcome.message, "username taken");
        assert_eq!(outcome.data, None);
    }
}
