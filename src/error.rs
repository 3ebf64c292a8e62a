use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("scheme {tags:?}: {reason}")]
    MalformedScheme { tags: Vec<String>, reason: String },
    #[error("user scheme #{index} is invalid")]
    InvalidScheme {
        index: usize,
        #[source]
        source: Box<ConfigError>,
    },
    #[error("scheme {tags:?}: invalid pattern: {source}")]
    InvalidPattern {
        tags: Vec<String>,
        #[source]
        source: regex::Error,
    },
    #[error("scheme {0:?} uses the custom opener but has no post handler")]
    MissingPostHandler(Vec<String>),
}

#[derive(Debug, Error)]
pub enum OpenError {
    #[error("could not resolve the path of: {0}")]
    FailedResolvePath(String),
    #[error("platform {0} not supported")]
    NotSupportedPlatform(&'static str),
    #[error("no suitable app found: {0}")]
    NoSuitableAppFound(String),
    #[error("{kind} opener cannot handle {action}")]
    PatternNotMatching { kind: String, action: String },
    #[error("command `{command}` failed: {reason}")]
    CommandFailed { command: String, reason: String },
    #[error("scheme {0:?} uses the custom opener but has no post handler")]
    MissingPostHandler(Vec<String>),
}

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("malformed selection: {0}")]
    Malformed(String),
    #[error("pattern of scheme [{tag}] did not match {text:?} unexpectedly")]
    Rematch { tag: String, text: String },
    #[error(transparent)]
    Open(#[from] OpenError),
}

#[derive(Debug, Error)]
pub enum SelectorError {
    #[error("selection interrupted")]
    Interrupted,
    #[error("selector failed: {0}")]
    Failed(String),
    #[error("failed to run selector: {0}")]
    Io(#[from] std::io::Error),
}
