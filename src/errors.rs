use std::borrow::Cow;

pub use std::error::Error as StdError;

/// Result type returned from functions that can have our `Error`s.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong while talking to an upstream provider or
/// making sense of what it sent back.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Connection-level failure: DNS, refused connection, TLS, a body that
    /// never finished.
    #[error("network error: {0}")]
    Network(Cow<'static, str>),
    /// No complete response within [`crate::REQWEST_TIMEOUT`].
    #[error("request timed out")]
    Timeout,
    /// The payload arrived but a structurally required field is missing.
    #[error("malformed payload: {0}")]
    MalformedPayload(Cow<'static, str>),
    /// A feed body that could not be read as a whole. Single bad items
    /// inside an otherwise readable feed are skipped, not reported here.
    #[error("unparsable feed: {0}")]
    ParseFailure(Cow<'static, str>),
    /// Bad or missing runtime configuration.
    #[error("configuration error: {0}")]
    Config(Cow<'static, str>),
}

impl Error {
    pub fn malformed<M: Into<Cow<'static, str>>>(message: M) -> Self {
        Self::MalformedPayload(message.into())
    }

    pub fn parse<M: Into<Cow<'static, str>>>(message: M) -> Self {
        Self::ParseFailure(message.into())
    }

    pub fn config<M: Into<Cow<'static, str>>>(message: M) -> Self {
        Self::Config(message.into())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(err.without_url().to_string().into())
        }
    }
}

pub trait OptionExt<T> {
    /// Unwrap with a `MalformedPayload` carrying `message`.
    fn or_malformed<M: Into<Cow<'static, str>>>(self, message: M) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_malformed<M: Into<Cow<'static, str>>>(self, message: M) -> Result<T> {
        self.ok_or_else(|| Error::MalformedPayload(message.into()))
    }
}
