//! Configuration management for the palette server.
//!
//! This module provides the configuration system, which supports:
//! - Command-line arguments via clap
//! - Environment variables with `PALETTE_` prefix
//! - Defaults for all optional settings
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use palette_server::config::Config;
//!
//! let config = Config::parse();
//! println!("Listening on {}", config.bind_address());
//! ```
//!
//! # Environment Variables
//!
//! - `PALETTE_HOST` - Server bind address (default: 0.0.0.0)
//! - `PALETTE_PORT` - Server port (default: 3000)
//! - `PALETTE_ALLOWED_HOSTS` - Comma-separated image hosts (default: i.scdn.co)
//! - `PALETTE_REDIS_URL` - Redis URL for the durable tier (default: in-memory)
//! - `PALETTE_FAST_CACHE_ENTRIES` - Fast tier capacity (default: 10000)
//! - `PALETTE_SAMPLE_STRIDE` - Pixel sampling stride (default: 1)
//! - `PALETTE_CACHE_MAX_AGE` - HTTP s-maxage seconds (default: 2592000)
//! - `PALETTE_CORS_ORIGINS` - Comma-separated CORS origins (default: any)

use std::num::NonZeroUsize;

use clap::Parser;

use crate::cache::DEFAULT_FAST_CACHE_ENTRIES;
use crate::server::DEFAULT_CACHE_MAX_AGE;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default image host allow-list.
pub const DEFAULT_ALLOWED_HOST: &str = "i.scdn.co";

/// Default sampling stride (every pixel).
pub const DEFAULT_SAMPLE_STRIDE: usize = 1;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Palette Server - Dominant color palettes for remote images.
///
/// Fetches an image, reduces it to a handful of representative colors with
/// median-cut quantization and caches the result for 30 days.
#[derive(Parser, Debug, Clone)]
#[command(name = "palette-server")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "PALETTE_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "PALETTE_PORT")]
    pub port: u16,

    /// Image hosts that may be requested (comma-separated).
    #[arg(
        long,
        default_value = DEFAULT_ALLOWED_HOST,
        env = "PALETTE_ALLOWED_HOSTS",
        value_delimiter = ','
    )]
    pub allowed_hosts: Vec<String>,

    // =========================================================================
    // Cache Configuration
    // =========================================================================
    /// Redis URL for the durable cache tier.
    ///
    /// If not specified, palettes are kept in process memory and lost on
    /// restart.
    #[arg(long, env = "PALETTE_REDIS_URL")]
    pub redis_url: Option<String>,

    /// Maximum number of palettes in the in-process fast tier.
    #[arg(long, default_value_t = DEFAULT_FAST_CACHE_ENTRIES, env = "PALETTE_FAST_CACHE_ENTRIES")]
    pub fast_cache_entries: usize,

    /// HTTP Cache-Control s-maxage in seconds.
    #[arg(long, default_value_t = DEFAULT_CACHE_MAX_AGE, env = "PALETTE_CACHE_MAX_AGE")]
    pub cache_max_age: u32,

    // =========================================================================
    // Palette Configuration
    // =========================================================================
    /// Sample every Nth pixel when building a palette.
    #[arg(long, default_value_t = DEFAULT_SAMPLE_STRIDE, env = "PALETTE_SAMPLE_STRIDE")]
    pub sample_stride: usize,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "PALETTE_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.allowed_hosts.iter().all(|h| h.trim().is_empty()) {
            return Err(
                "At least one allowed image host is required. Set --allowed-hosts or PALETTE_ALLOWED_HOSTS"
                    .to_string(),
            );
        }

        if self.fast_cache_entries == 0 {
            return Err("fast_cache_entries must be greater than 0".to_string());
        }

        if self.sample_stride == 0 {
            return Err("sample_stride must be at least 1".to_string());
        }

        if let Some(ref url) = self.redis_url {
            if !(url.starts_with("redis://") || url.starts_with("rediss://")) {
                return Err(format!(
                    "redis_url must start with redis:// or rediss://, got '{}'",
                    url
                ));
            }
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Allowed hosts with surrounding whitespace and empty entries removed.
    pub fn allowed_hosts(&self) -> Vec<String> {
        self.allowed_hosts
            .iter()
            .map(|h| h.trim())
            .filter(|h| !h.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Sampling stride, clamped to at least 1.
    pub fn sample_stride(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.sample_stride).unwrap_or(NonZeroUsize::MIN)
    }
}

// =============================================================================
// Tests
// =============================================================================
