//! `Set-Cookie` values for the session token.

/// Name of the cookie carrying the JWT.
pub const TOKEN_COOKIE: &str = "token";

/// HttpOnly cookie holding `token`, valid for `max_age` seconds.
///
/// `Secure` is added when the deployment serves HTTPS.
pub fn token_cookie(token: &str, max_age: i64, secure: bool) -> String {
    let secure = if secure { " Secure;" } else { "" };
    format!("{TOKEN_COOKIE}={token}; HttpOnly;{secure} SameSite=Strict; Path=/; Max-Age={max_age}")
}

/// Expires the token cookie immediately.
pub fn clear_token_cookie(secure: bool) -> String {
    token_cookie("", 0, secure)
}
