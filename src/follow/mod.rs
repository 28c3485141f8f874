//! Link following.
//!
//! Turns follow targets (URL strings, structured links, selector results)
//! into outbound request descriptors:
//! 1. `LinkTarget::normalize` validates the target and yields a URL candidate
//! 2. `UrlResolver` joins the candidate against the effective base URL
//! 3. `RequestDescriptor::new` merges the caller's `FollowSpec`
//!
//! Single-target following reports every failure; bulk following skips
//! targets that fail and only rejects an ambiguous source.

mod bulk;
mod request;
mod target;
mod urljoin;

use url::Url;

use crate::encoding::Charset;
use crate::error_handling::FollowError;

// Re-export public API
pub use bulk::{FollowAll, FollowAllArgs};
pub use request::{Body, FollowSpec, RequestDescriptor};
pub use target::{Link, LinkTarget};
pub use urljoin::UrlResolver;

pub(crate) use bulk::TargetSource;

/// Builds the request for one target.
///
/// `default_charset` is used when `spec.encoding` is unset; it is only
/// evaluated in that case.
///
/// # Errors
///
/// Returns the normalization error of the target, or
/// `FollowError::UnresolvableUrl` if the candidate cannot be joined.
pub fn build_request<'c>(
    target: &LinkTarget,
    spec: &FollowSpec,
    base: &Url,
    default_charset: impl FnOnce() -> &'c Charset,
) -> Result<RequestDescriptor, FollowError> {
    let candidate = target.normalize()?;
    let charset = match &spec.encoding {
        Some(charset) => charset.clone(),
        None => default_charset().clone(),
    };
    let url = UrlResolver::new(base)
        .resolve_with_charset(candidate, &charset)
        .map_err(|e| FollowError::UnresolvableUrl {
            url: candidate.to_string(),
            reason: e.to_string(),
        })?;
    Ok(RequestDescriptor::new(url, spec, charset))
}
