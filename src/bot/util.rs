//! Small helpers shared by the window handlers.

use std::future::IntoFuture;
use teloxide::types::User;
use teloxide::{ApiError, RequestError};
use tracing::debug;

/// Run a platform call and apply the given suppression policy.
///
/// With `suppress` the failure is logged at debug level and swallowed;
/// without it the error is returned for the caller to propagate. Keeping
/// both paths behind one helper makes it easy to audit which calls are
/// allowed to fail silently.
pub async fn guarded<T, F>(
    what: &str,
    suppress: bool,
    fut: F,
) -> Result<Option<T>, RequestError>
where
    F: IntoFuture<Output = Result<T, RequestError>>,
{
    match fut.await {
        Ok(value) => Ok(Some(value)),
        Err(e) if suppress => {
            debug!("{} failed (suppressed): {:#}", what, e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Fire-and-forget variant of [`guarded`] for cleanup and notices whose
/// failure must never abort the turn.
pub async fn best_effort<T, F>(what: &str, fut: F) -> Option<T>
where
    F: IntoFuture<Output = Result<T, RequestError>>,
{
    match guarded(what, true, fut).await {
        Ok(value) => value,
        Err(_) => None,
    }
}

/// HTML mention of a user by their visible name.
pub fn mention(user: &User) -> String {
    teloxide::utils::html::user_mention(user.id, &user.full_name())
}

/// Whether a request failed because the target forum topic is closed.
/// Surfaced as a distinct condition so topic selection can warn the admin
/// instead of failing the whole turn.
pub fn is_topic_closed(err: &RequestError) -> bool {
    match err {
        RequestError::Api(ApiError::Unknown(text)) => text.contains("TOPIC_CLOSED"),
        _ => false,
    }
}
