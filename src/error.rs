use thiserror::Error;

/// Structural problems in a topology table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TopologyError {
    #[error("duplicate element id `{0}`")]
    DuplicateId(String),
    #[error("device `{device}` references unknown site `{site}`")]
    UnknownSite { device: String, site: String },
    #[error("link `{link}` references unknown element `{element}`")]
    UnknownElement { link: String, element: String },
    #[error("link `{0}` connects an element to itself")]
    SelfLink(String),
    #[error("devices `{first}` and `{second}` overlap in site `{site}`")]
    Overlap {
        site: String,
        first: String,
        second: String,
    },
    #[error("{what} size must be positive, got {width}x{height}")]
    InvalidSize {
        what: String,
        width: f32,
        height: f32,
    },
}

/// Problems found while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {message}")]
    Parse { path: String, message: String },
    #[error("unknown theme `{0}` (expected `classic` or `contrast`)")]
    UnknownTheme(String),
    #[error("invalid colour `{value}` for `{key}`")]
    InvalidColor { key: String, value: String },
    #[error("`{key}` must be positive, got {value}")]
    NonPositive { key: String, value: f32 },
}
