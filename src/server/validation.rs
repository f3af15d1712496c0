//! Request validation for the palette endpoints.
//!
//! Runs before the pipeline: checks the image URL against the host
//! allow-list, extracts the content slug, and parses the color count.
//! A request that fails here never reaches the cache or the image host.

use thiserror::Error;
use url::Url;

use crate::palette::DEFAULT_COLOR_COUNT;
use crate::service::PaletteRequest;

/// Default image host allow-list.
pub const DEFAULT_ALLOWED_HOSTS: &[&str] = &["i.scdn.co"];

/// Smallest count accepted on the query string.
pub const MIN_QUERY_COUNT: usize = 1;

/// Largest count accepted on the query string.
pub const MAX_QUERY_COUNT: usize = 10;

/// Length of the slug taken from the image URL.
pub const SLUG_LEN: usize = 40;

/// Validation failures, reported to the client as 400.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing image url. specify with ?image=")]
    MissingImageUrl,

    /// Not an absolute http(s) URL, or no slug could be found in it
    #[error("invalid image url")]
    InvalidImageUrl,

    #[error("image host not allowed")]
    HostNotAllowed { host: String },

    /// Not an integer, or outside 1-10
    #[error("invalid color count specified.")]
    InvalidColorCount,
}

/// Validates raw query parameters into a [`PaletteRequest`].
#[derive(Debug, Clone)]
pub struct RequestValidator {
    allowed_hosts: Vec<String>,
}

impl RequestValidator {
    pub fn new<I, S>(allowed_hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_hosts: allowed_hosts
                .into_iter()
                .map(|h| h.into().to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn allowed_hosts(&self) -> &[String] {
        &self.allowed_hosts
    }

    /// Validate an `image` / `count` pair.
    ///
    /// Checks run in order: image present, URL and host, count, slug. A
    /// missing or empty `count` defaults to 4. A count of 1 passes here and
    /// is rejected by the palette pipeline.
    pub fn validate(
        &self,
        image: Option<&str>,
        count: Option<&str>,
    ) -> Result<PaletteRequest, ValidationError> {
        let image = self.check_host(image)?;
        let color_count = parse_count(count)?;
        let slug = extract_slug(image).ok_or(ValidationError::InvalidImageUrl)?;
        Ok(PaletteRequest::new(image, slug, color_count))
    }

    /// Validate only the image URL, returning it with its slug.
    pub fn validate_image(&self, image: Option<&str>) -> Result<(String, String), ValidationError> {
        let image = self.check_host(image)?;
        let slug = extract_slug(image).ok_or(ValidationError::InvalidImageUrl)?;
        Ok((image.to_string(), slug.to_string()))
    }

    fn check_host<'a>(&self, image: Option<&'a str>) -> Result<&'a str, ValidationError> {
        let image = match image {
            Some(image) if !image.is_empty() => image,
            _ => return Err(ValidationError::MissingImageUrl),
        };

        let url = Url::parse(image).map_err(|_| ValidationError::InvalidImageUrl)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ValidationError::InvalidImageUrl);
        }

        let host = url
            .host_str()
            .ok_or(ValidationError::InvalidImageUrl)?
            .to_ascii_lowercase();
        if !self.allowed_hosts.iter().any(|allowed| *allowed == host) {
            return Err(ValidationError::HostNotAllowed { host });
        }

        Ok(image)
    }
}

impl Default for RequestValidator {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_HOSTS.iter().copied())
    }
}

/// Find the first run of [`SLUG_LEN`] word characters (`[A-Za-z0-9_]`).
pub fn extract_slug(url: &str) -> Option<&str> {
    let bytes = url.as_bytes();
    let mut run_start = 0;

    for (i, &b) in bytes.iter().enumerate() {
        if !(b.is_ascii_alphanumeric() || b == b'_') {
            run_start = i + 1;
            continue;
        }
        if i + 1 - run_start == SLUG_LEN {
            return url.get(run_start..=i);
        }
    }

    None
}

fn parse_count(count: Option<&str>) -> Result<usize, ValidationError> {
    let count = match count {
        None | Some("") => return Ok(DEFAULT_COLOR_COUNT),
        Some(count) => count,
    };

    let count: usize = count
        .parse()
        .map_err(|_| ValidationError::InvalidColorCount)?;

    if (MIN_QUERY_COUNT..=MAX_QUERY_COUNT).contains(&count) {
        Ok(count)
    } else {
        Err(ValidationError::InvalidColorCount)
    }
}
