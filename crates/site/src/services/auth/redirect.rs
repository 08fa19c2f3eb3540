//! Login redirect construction.

use url::form_urlencoded;

use super::Denial;

/// Admin login page.
pub const LOGIN_PATH: &str = "/admin/login";

/// Where a successful login lands when no usable `next` was supplied.
pub const DEFAULT_AFTER_LOGIN: &str = "/admin/submissions";

/// Build the login URL a denied request is redirected to.
///
/// `next` is the originally requested path. `forbidden=1` is added for
/// profile-stage denials, and `reason` only when `expose_reason` is set
/// (non-production deployments).
#[must_use]
pub fn login_redirect_url(next: &str, denial: Denial, expose_reason: bool) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("next", next);
    if denial.is_forbidden() {
        query.append_pair("forbidden", "1");
    }
    if expose_reason {
        query.append_pair("reason", denial.reason());
    }
    format!("{LOGIN_PATH}?{}", query.finish())
}

/// Reduce a user-supplied `next` value to a same-site path.
///
/// Anything that is not a plain absolute path (scheme-relative `//host`,
/// backslash tricks, full URLs) falls back to [`DEFAULT_AFTER_LOGIN`].
#[must_use]
pub fn sanitize_next(next: Option<&str>) -> String {
    match next.map(str::trim) {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(char::is_control) =>
        {
            path.to_string()
        }
        _ => DEFAULT_AFTER_LOGIN.to_string(),
    }
}
