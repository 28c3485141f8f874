//! Bulk following.

use log::debug;

use super::{LinkTarget, RequestDescriptor};
use crate::error_handling::FollowError;
use crate::follow::FollowSpec;
use crate::response::Response;

/// Where `follow_all` takes its targets from. Exactly one field must be set.
///
/// # Examples
///
/// ```
/// use text_response::FollowAllArgs;
///
/// let args = FollowAllArgs::css("ul.pager a");
/// assert!(args.urls.is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FollowAllArgs {
    /// Explicit targets
    pub urls: Option<Vec<LinkTarget>>,
    /// CSS query run against the response
    pub css: Option<String>,
    /// XPath query run against the response
    pub xpath: Option<String>,
}

impl FollowAllArgs {
    pub fn urls<I, T>(targets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<LinkTarget>,
    {
        Self {
            urls: Some(targets.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    pub fn css(query: impl Into<String>) -> Self {
        Self {
            css: Some(query.into()),
            ..Default::default()
        }
    }

    pub fn xpath(query: impl Into<String>) -> Self {
        Self {
            xpath: Some(query.into()),
            ..Default::default()
        }
    }

    /// Checks that exactly one source is set.
    ///
    /// # Errors
    ///
    /// Returns `FollowError::AmbiguousSource` when zero or several are set.
    pub(crate) fn into_source(self) -> Result<TargetSource, FollowError> {
        match (self.urls, self.css, self.xpath) {
            (Some(targets), None, None) => Ok(TargetSource::Targets(targets)),
            (None, Some(query), None) => Ok(TargetSource::Css(query)),
            (None, None, Some(query)) => Ok(TargetSource::XPath(query)),
            _ => Err(FollowError::AmbiguousSource),
        }
    }
}

/// A validated `FollowAllArgs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TargetSource {
    Targets(Vec<LinkTarget>),
    Css(String),
    XPath(String),
}

/// Lazy sequence of requests produced by `Response::follow_all`.
///
/// Targets are normalized and resolved one at a time as the iterator is
/// advanced; targets that cannot produce a URL are skipped. Each clone
/// continues independently from the position it was cloned at.
#[derive(Debug, Clone)]
pub struct FollowAll<'r> {
    response: &'r Response,
    targets: std::vec::IntoIter<LinkTarget>,
    spec: FollowSpec,
}

impl<'r> FollowAll<'r> {
    pub(crate) fn new(response: &'r Response, targets: Vec<LinkTarget>, spec: FollowSpec) -> Self {
        Self {
            response,
            targets: targets.into_iter(),
            spec,
        }
    }
}

impl Iterator for FollowAll<'_> {
    type Item = RequestDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        for target in self.targets.by_ref() {
            match self.response.request_for(&target, &self.spec) {
                Ok(request) => return Some(request),
                Err(e) => debug!("Skipping follow target {target}: {e}"),
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.targets.size_hint().1)
    }
}
