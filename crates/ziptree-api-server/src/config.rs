//! Server configuration from command-line flags and environment variables

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use ziptree_archive::RolePolicy;

/// Default request body limit (100 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Default time allowed for storing and listing one upload
pub const DEFAULT_LISTING_TIMEOUT_SECS: u64 = 30;

/// Path of the health endpoint, unavailable as an upload route
pub const HEALTH_ROUTE: &str = "/health";

/// Invalid configuration values
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Upload route is not an absolute path
    #[error("upload route must start with '/', got {0:?}")]
    InvalidRoute(String),

    /// Upload route collides with a built-in endpoint
    #[error("upload route {0:?} is already used by another endpoint")]
    ReservedRoute(String),

    /// Body limit of zero bytes
    #[error("max upload size must be greater than zero")]
    ZeroUploadLimit,

    /// Listing timeout of zero seconds
    #[error("listing timeout must be greater than zero")]
    ZeroTimeout,
}

/// ZIP tree visualizer server
#[derive(Debug, Clone, Parser)]
#[command(name = "ziptree-server", version, about)]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "ZIPTREE_ADDR", default_value = "0.0.0.0:8080")]
    pub addr: String,

    /// Path of the upload endpoint
    #[arg(long, env = "ZIPTREE_UPLOAD_ROUTE", default_value = "/api/upload")]
    pub upload_route: String,

    /// Directory for transient upload files (defaults to the system temp dir)
    #[arg(long, env = "ZIPTREE_TEMP_DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Maximum accepted request body in bytes
    #[arg(long, env = "ZIPTREE_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    /// Seconds allowed for storing and listing one upload
    #[arg(
        long,
        env = "ZIPTREE_LISTING_TIMEOUT_SECS",
        default_value_t = DEFAULT_LISTING_TIMEOUT_SECS
    )]
    pub listing_timeout_secs: u64,

    /// Directory of static frontend files served for unmatched GET requests
    #[arg(long, env = "ZIPTREE_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// Promote file nodes to directories when a later entry walks through them
    #[arg(long, env = "ZIPTREE_PROMOTE_DIRECTORIES")]
    pub promote_directories: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".to_string(),
            upload_route: "/api/upload".to_string(),
            temp_dir: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            listing_timeout_secs: DEFAULT_LISTING_TIMEOUT_SECS,
            static_dir: None,
            promote_directories: false,
        }
    }
}

impl ServerConfig {
    /// Check values clap cannot check on its own
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.upload_route.starts_with('/') {
            return Err(ConfigError::InvalidRoute(self.upload_route.clone()));
        }
        if self.upload_route == HEALTH_ROUTE {
            return Err(ConfigError::ReservedRoute(self.upload_route.clone()));
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::ZeroUploadLimit);
        }
        if self.listing_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Timeout applied around storage and listing of one upload
    #[must_use]
    pub fn listing_timeout(&self) -> Duration {
        Duration::from_secs(self.listing_timeout_secs)
    }

    /// Role policy for tree construction
    #[must_use]
    pub fn role_policy(&self) -> RolePolicy {
        if self.promote_directories {
            RolePolicy::PromoteToDirectory
        } else {
            RolePolicy::FirstSeenWins
        }
    }

    /// Directory for transient upload files
    #[must_use]
    pub fn transient_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}
