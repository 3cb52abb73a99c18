//! Key naming rules: response names, media-type suffixes, request keys

use std::sync::LazyLock;

use regex::Regex;

/// Maximal run of non-word characters (ASCII word set, as in URI templates).
static NON_WORD_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]+").expect("static pattern is valid"));

/// Status code used when a response has no explicit code.
pub const DEFAULT_STATUS: &str = "default";

/// Base key for a response.
///
/// Common status codes map to their RFC 9110 reason phrase in camelCase;
/// anything else is returned unchanged, and a missing code becomes `default`.
#[must_use]
pub fn response_name(status_code: Option<&str>) -> String {
    let Some(code) = status_code else {
        return DEFAULT_STATUS.to_string();
    };
    let phrase = match code {
        "200" => "ok",
        "201" => "created",
        "202" => "accepted",
        "204" => "noContent",
        "400" => "badRequest",
        "401" => "unauthorized",
        "403" => "forbidden",
        "404" => "notFound",
        "405" => "methodNotAllowed",
        other => other,
    };
    phrase.to_string()
}

/// Turn a media type into an identifier-safe key suffix.
///
/// Lowercases, then collapses each maximal run of non-word characters into a
/// single `-`. A run at the very end of the string is kept as-is.
///
/// `application/vnd.api+json` → `application-vnd-api-json`
#[must_use]
pub fn sanitize_media_type(media_type: &str) -> String {
    let lowered = media_type.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut last = 0;
    for run in NON_WORD_RUN.find_iter(&lowered) {
        out.push_str(&lowered[last..run.start()]);
        if run.end() == lowered.len() {
            out.push_str(run.as_str());
        } else {
            out.push('-');
        }
        last = run.end();
    }
    out.push_str(&lowered[last..]);
    out
}

/// `<base>-<sanitized media type>`
#[must_use]
pub fn qualified_key(base: &str, media_type: &str) -> String {
    format!("{base}-{}", sanitize_media_type(media_type))
}

/// Base key of a request: the operation id, or the method name.
#[must_use]
pub fn request_base(operation_id: Option<&str>, method: &str) -> String {
    operation_id.unwrap_or(method).to_string()
}
