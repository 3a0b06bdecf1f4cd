/*!
 * Configuration types for Ferry
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Result, TransferError};
use crate::protocol::s3::{CannedAcl, S3Config, DEFAULT_REGION};

/// Which family of environment variables configures the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// `S3_*` variables; AWS unless `S3_ENDPOINT` is set
    #[default]
    S3,

    /// `MINIO_*` variables; always an S3-compatible endpoint
    Minio,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::S3 => write!(f, "s3"),
            BackendKind::Minio => write!(f, "minio"),
        }
    }
}

/// Process-wide configuration, read once at start-up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub backend: BackendKind,

    /// Canned ACL for stored objects; `"none"` leaves it to the bucket policy
    #[serde(default = "default_acl", with = "acl_setting")]
    pub acl: Option<CannedAcl>,

    /// Bucket, endpoint and credentials
    pub storage: S3Config,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_acl() -> Option<CannedAcl> {
    Some(CannedAcl::Private)
}

impl ServiceConfig {
    /// Load from the process environment
    ///
    /// The binary loads `.env` into the environment once at start-up, before
    /// this runs.
    pub fn from_env(backend: BackendKind) -> Result<Self> {
        Self::from_lookup(backend, |key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable source
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(backend: BackendKind, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(&lookup);

        let (storage, acl) = match backend {
            BackendKind::S3 => {
                let region = vars.required("S3_REGION")?;
                let mut storage = S3Config::new(vars.required("S3_BUCKET")?);
                storage.access_key = Some(vars.required("S3_ACCESS_KEY")?);
                storage.secret_key = Some(vars.required("S3_SECRET_KEY")?);
                storage.endpoint = vars.optional("S3_ENDPOINT");
                storage.use_ssl = match vars.optional("S3_USE_SSL") {
                    Some(raw) => parse_bool("S3_USE_SSL", &raw)?,
                    None => true,
                };
                storage.bucket_location = Some(region.clone());
                storage.region = Some(region);
                (storage, vars.acl("S3_ACL")?)
            }
            BackendKind::Minio => {
                let endpoint = vars.required("MINIO_ENDPOINT")?;
                let access_key = vars.required("MINIO_ACCESSKEY")?;
                let secret_key = vars.required("MINIO_SECRETKEY")?;
                let use_ssl = parse_bool("MINIO_USESSL", &vars.required("MINIO_USESSL")?)?;
                let location = vars
                    .optional("MINIO_LOCATION")
                    .unwrap_or_else(|| DEFAULT_REGION.to_string());

                let mut storage = S3Config::new(vars.required("MINIO_BUCKETNAME")?);
                storage.endpoint = Some(endpoint);
                storage.access_key = Some(access_key);
                storage.secret_key = Some(secret_key);
                storage.use_ssl = use_ssl;
                storage.force_path_style = true;
                storage.region = Some(location.clone());
                storage.bucket_location = Some(location);
                (storage, vars.acl("MINIO_ACL")?)
            }
        };

        let config = Self {
            backend,
            storage,
            acl,
            logging: LoggingConfig::from_lookup(&lookup)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            TransferError::Configuration(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let config: ServiceConfig = toml::from_str(&contents).map_err(|e| {
            TransferError::Configuration(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| TransferError::Configuration(format!("Failed to serialise config: {}", e)))?;
        std::fs::write(path, contents).map_err(|e| {
            TransferError::Configuration(format!(
                "Failed to write config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.storage
            .validate()
            .map_err(|e| TransferError::Configuration(e.to_string()))?;

        if self.backend == BackendKind::Minio && !self.storage.is_custom_endpoint() {
            return Err(TransferError::Configuration(
                "MinIO backend requires an endpoint".to_string(),
            ));
        }

        if !self.storage.has_explicit_credentials() {
            return Err(TransferError::Configuration(
                "access key and secret key are required".to_string(),
            ));
        }

        Ok(())
    }

    /// Copy with credentials masked, for display
    pub fn redacted(&self) -> Self {
        let mask = |v: &Option<String>| v.as_ref().map(|_| "********".to_string());
        let mut copy = self.clone();
        copy.storage.access_key = mask(&self.storage.access_key);
        copy.storage.secret_key = mask(&self.storage.secret_key);
        copy.storage.session_token = mask(&self.storage.session_token);
        copy
    }
}

/// Log output settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub format: LogFormat,

    /// Shorthand for `level = debug`
    #[serde(default)]
    pub verbose: bool,
}

impl LoggingConfig {
    /// Read `LOG_LEVEL` and `LOG_FORMAT`
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(&lookup);
        let level = match vars.optional("LOG_LEVEL") {
            Some(raw) => raw.parse()?,
            None => LogLevel::default(),
        };
        let format = match vars.optional("LOG_FORMAT") {
            Some(raw) => raw.parse()?,
            None => LogFormat::default(),
        };

        Ok(Self {
            level,
            format,
            verbose: false,
        })
    }

    /// Level after applying `verbose`
    pub fn effective_level(&self) -> LogLevel {
        if self.verbose {
            LogLevel::Debug
        } else {
            self.level
        }
    }
}

/// Logging level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only errors
    Error,

    /// Warnings and errors
    Warn,

    /// Info, warnings, and errors
    #[default]
    Info,

    /// Debug and above
    Debug,

    /// Everything
    Trace,
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

impl FromStr for LogLevel {
    type Err = TransferError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(TransferError::Configuration(format!(
                "unknown log level {:?}",
                other
            ))),
        }
    }
}

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable single line
    #[default]
    Compact,

    /// One JSON object per line
    Json,
}

impl FromStr for LogFormat {
    type Err = TransferError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(TransferError::Configuration(format!(
                "unknown log format {:?}",
                other
            ))),
        }
    }
}

/// Boolean parsing with the same accepted spellings as Go's `strconv.ParseBool`
pub fn parse_bool(name: &str, raw: &str) -> Result<bool> {
    match raw.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        other => Err(TransferError::Configuration(format!(
            "{} must be a boolean, got {:?}",
            name, other
        ))),
    }
}

/// ACL setting: a canned ACL name, or `none` to omit the header
pub fn parse_acl(name: &str, raw: &str) -> Result<Option<CannedAcl>> {
    if raw.trim().eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    raw.parse::<CannedAcl>()
        .map(Some)
        .map_err(|e| TransferError::Configuration(format!("{}: {}", name, e)))
}

struct Vars<'a, F>(&'a F);

impl<F> Vars<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, name: &str) -> Option<String> {
        (self.0)(name).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, name: &str) -> Result<String> {
        self.optional(name)
            .ok_or_else(|| TransferError::Configuration(format!("{} not provided", name)))
    }

    fn acl(&self, name: &str) -> Result<Option<CannedAcl>> {
        match self.optional(name) {
            Some(raw) => parse_acl(name, &raw),
            None => Ok(default_acl()),
        }
    }
}

mod acl_setting {
    use super::parse_acl;
    use crate::protocol::s3::CannedAcl;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(acl: &Option<CannedAcl>, serializer: S) -> Result<S::Ok, S::Error> {
        match acl {
            Some(acl) => serializer.serialize_str(&acl.to_string()),
            None => serializer.serialize_str("none"),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<CannedAcl>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_acl("acl", &raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn s3_vars() -> Vec<(&'static str, &'static str)> {
        vec![
            ("S3_REGION", "eu-west-1"),
            ("S3_BUCKET", "mvp-file-storage"),
            ("S3_ACCESS_KEY", "AKIDEXAMPLE"),
            ("S3_SECRET_KEY", "secret"),
        ]
    }

    #[test]
    fn test_s3_from_lookup() {
        let config = ServiceConfig::from_lookup(BackendKind::S3, lookup_from(&s3_vars())).unwrap();

        assert_eq!(config.storage.bucket, "mvp-file-storage");
        assert_eq!(config.storage.effective_region(), "eu-west-1");
        assert_eq!(config.storage.flavor(), crate::protocol::s3::BackendFlavor::Aws);
        assert_eq!(config.acl, Some(CannedAcl::Private));
        assert!(config.storage.use_ssl);
    }

    #[test]
    fn test_missing_required_variable() {
        let mut vars = s3_vars();
        vars.retain(|(k, _)| *k != "S3_BUCKET");

        let err = ServiceConfig::from_lookup(BackendKind::S3, lookup_from(&vars)).unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: S3_BUCKET not provided");
        assert_eq!(err.exit_code(), crate::error::EXIT_CONFIG);
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let vars: Vec<_> = s3_vars()
            .into_iter()
            .map(|(k, v)| if k == "S3_ACCESS_KEY" { (k, "  ") } else { (k, v) })
            .collect();

        assert!(ServiceConfig::from_lookup(BackendKind::S3, lookup_from(&vars)).is_err());
    }

    #[test]
    fn test_minio_from_lookup() {
        let vars = [
            ("MINIO_ENDPOINT", "minio.internal:9000"),
            ("MINIO_ACCESSKEY", "minioadmin"),
            ("MINIO_SECRETKEY", "minioadmin"),
            ("MINIO_USESSL", "F"),
            ("MINIO_BUCKETNAME", "files"),
            ("MINIO_ACL", "public-read"),
        ];
        let config = ServiceConfig::from_lookup(BackendKind::Minio, lookup_from(&vars)).unwrap();

        assert_eq!(
            config.storage.flavor(),
            crate::protocol::s3::BackendFlavor::Compatible
        );
        assert_eq!(
            config.storage.endpoint_url().as_deref(),
            Some("http://minio.internal:9000")
        );
        assert_eq!(config.storage.effective_bucket_location(), DEFAULT_REGION);
        assert_eq!(config.acl, Some(CannedAcl::PublicRead));
    }

    #[test]
    fn test_minio_usessl_is_required_and_parsed() {
        let vars = [
            ("MINIO_ENDPOINT", "minio.internal:9000"),
            ("MINIO_ACCESSKEY", "minioadmin"),
            ("MINIO_SECRETKEY", "minioadmin"),
            ("MINIO_USESSL", "yes"),
            ("MINIO_BUCKETNAME", "files"),
        ];
        let err = ServiceConfig::from_lookup(BackendKind::Minio, lookup_from(&vars)).unwrap_err();
        assert!(err.to_string().contains("MINIO_USESSL"));
    }

    #[test]
    fn test_parse_bool_spellings() {
        for raw in ["1", "t", "T", "true", "TRUE", "True"] {
            assert!(parse_bool("X", raw).unwrap());
        }
        for raw in ["0", "f", "F", "false", "FALSE", "False"] {
            assert!(!parse_bool("X", raw).unwrap());
        }
        assert!(parse_bool("X", "tRuE").is_err());
    }

    #[test]
    fn test_acl_none() {
        assert_eq!(parse_acl("S3_ACL", "none").unwrap(), None);
        assert_eq!(
            parse_acl("S3_ACL", "bucket-owner-full-control").unwrap(),
            Some(CannedAcl::BucketOwnerFullControl)
        );
        assert!(parse_acl("S3_ACL", "world-writable").is_err());
    }

    #[test]
    fn test_logging_from_lookup() {
        let logging =
            LoggingConfig::from_lookup(lookup_from(&[("LOG_LEVEL", "DEBUG"), ("LOG_FORMAT", "json")]))
                .unwrap();
        assert_eq!(logging.level, LogLevel::Debug);
        assert_eq!(logging.format, LogFormat::Json);

        let defaults = LoggingConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(defaults.level, LogLevel::Info);
        assert_eq!(defaults.format, LogFormat::Compact);
    }

    #[test]
    fn test_verbose_overrides_log_level() {
        let logging = LoggingConfig {
            level: LogLevel::Error,
            verbose: true,
            ..Default::default()
        };
        assert_eq!(logging.effective_level(), LogLevel::Debug);
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(LogLevel::Error.to_tracing_level(), tracing::Level::ERROR);
        assert_eq!(LogLevel::Warn.to_tracing_level(), tracing::Level::WARN);
        assert_eq!(LogLevel::Info.to_tracing_level(), tracing::Level::INFO);
        assert_eq!(LogLevel::Debug.to_tracing_level(), tracing::Level::DEBUG);
        assert_eq!(LogLevel::Trace.to_tracing_level(), tracing::Level::TRACE);
    }

    #[test]
    fn test_redacted_masks_secrets() {
        let config = ServiceConfig::from_lookup(BackendKind::S3, lookup_from(&s3_vars())).unwrap();
        let shown = config.redacted();
        assert_eq!(shown.storage.secret_key.as_deref(), Some("********"));
        assert_eq!(shown.storage.bucket, config.storage.bucket);
    }
}
