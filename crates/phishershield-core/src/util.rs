/// Milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Last two labels of a hostname ("mail.accounts.example.co" → "example.co").
///
/// An approximation of the registrable domain; the scoring contract uses the
/// same approximation for its trusted-domain check, so both sides agree.
pub fn base_domain(hostname: &str) -> String {
    let labels: Vec<&str> = hostname.split('.').collect();
    if labels.len() <= 2 {
        hostname.to_string()
    } else {
        labels[labels.len() - 2..].join(".")
    }
}
