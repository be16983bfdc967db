//! Static tables consumed by the trust score aggregator.
//!
//! The exact contents are part of the scoring contract: two implementations
//! must find the same keywords and produce the same deduction strings.

/// Phishing phrases looked for in extracted page content.
/// Each distinct hit costs 5 points, capped at 30.
pub fn suspicious_keywords() -> &'static [&'static str] {
    &[
        "account locked",
        "verify your account",
        "urgent action required",
        "payment update",
        "click here to login",
        "reset password now",
        "transaction failed",
        "invoice pending",
        "security alert",
        "unusual activity",
        "confirm identity",
        "restricted access",
        "temporarily suspended",
    ]
}

/// TLDs disproportionately used for phishing. Leading dot included.
pub fn suspicious_tlds() -> &'static [&'static str] {
    &[
        ".xyz", ".top", ".club", ".online", ".site", ".click", ".info", ".biz", ".win",
    ]
}

/// Path keywords that are benign on trusted domains and suspicious elsewhere.
pub fn phishing_path_keywords() -> &'static [&'static str] {
    &[
        "login", "signin", "verify", "confirm", "account", "webscr", "update", "secure",
        "billing", "client",
    ]
}

/// Base domains exempt from the path-keyword heuristic.
pub fn trusted_base_domains() -> &'static [&'static str] {
    &[
        "google.com",
        "microsoft.com",
        "apple.com",
        "amazon.com",
        "paypal.com",
        "facebook.com",
        "twitter.com",
        "x.com",
        "wikipedia.org",
        "whoisxmlapi.com",
    ]
}
