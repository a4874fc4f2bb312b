// Profile reference parsing.

use super::error::ActivityError;

/// Extract the canonical username from a profile URL or bare username.
///
/// Any query string or fragment is dropped, then the last path segment wins
/// after trailing slashes are removed: `https://www.reddit.com/user/alice/`
/// and `alice` both give `alice`. The result is inserted into API paths, so
/// only Reddit's username alphabet (`A-Z a-z 0-9 _ -`) is accepted.
pub fn extract_username(profile_ref: &str) -> Result<String, ActivityError> {
    let path = profile_ref
        .trim()
        .split(['?', '#'])
        .next()
        .unwrap_or("")
        .trim_end_matches('/');
    let username = path.rsplit('/').next().unwrap_or("");

    let valid = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if username.is_empty() || !valid {
        return Err(ActivityError::InvalidProfile {
            input: profile_ref.to_string(),
        });
    }

    Ok(username.to_string())
}
