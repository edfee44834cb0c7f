// SPDX-License-Identifier: MIT OR Apache-2.0

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by piwik operations.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Credentials are absent or incomplete. Raised before any network attempt.
    #[error("missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("site does not exist in piwik yet, call `save` first")]
    UnknownSite,

    /// The remote service answered with an `<error message="...">` payload.
    #[error("piwik api error: {0}")]
    Api(String),

    #[error("invalid site: {0}")]
    Validation(String),

    #[error("site has been destroyed and can no longer be modified")]
    Frozen,

    #[error("network request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("failed to parse xml: {0}")]
    XmlParse(String),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    #[error("{0}")]
    Other(String),
}

macro_rules! error_ctor {
    ($($name:ident => $variant:ident),* $(,)?) => {
        $(
            pub(crate) fn $name(msg: impl Into<String>) -> Self {
                Self::$variant(msg.into())
            }
        )*
    };
}

impl Error {
    error_ctor!(
        missing_configuration => MissingConfiguration,
        api => Api,
        validation => Validation,
        xml_parse => XmlParse,
        timestamp => InvalidTimestamp,
        config => Config,
    );

    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Returns true for failures that may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Returns true when the local credentials file needs attention.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingConfiguration(_) | Self::Config(_))
    }
}
