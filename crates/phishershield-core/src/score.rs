//! Trust score aggregator.
//!
//! A pure, deterministic function over one scan's evidence. Starts at 100
//! and applies deductions in a fixed order (WHOIS age, registrar, Safe
//! Browsing, SSL, content keywords, URL patterns, IP abuse, DNS auth,
//! redirect, AI assessment, community reports), clamping the result to
//! [0, 100]. The ordering, the magnitudes, and the deduction strings are
//! the observable contract consumed by the UI.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::data;
use crate::signals::SignalBundle;
use crate::util::base_domain;
use crate::verdict::{ScanRequest, ScoreResult};

static IPV4_HOST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[0-9]{1,3}\.){3}[0-9]{1,3}$").unwrap());
static LONG_ALNUM_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9a-zA-Z]{30,}").unwrap());

/// Score one scan. Pure: identical inputs produce identical scores and
/// identical deduction lists.
pub fn evaluate(request: &ScanRequest, signals: &SignalBundle) -> ScoreResult {
    let mut score: i32 = 100;
    let mut deductions: Vec<String> = Vec::new();

    // WHOIS: age brackets are mutually exclusive, tested youngest first.
    if let Some(age) = signals.whois.domain_age_days {
        if age < 180 {
            score -= 40;
            deductions.push("Domain age < 180 days (-40)".to_string());
        } else if age < 365 {
            score -= 20;
            deductions.push("Domain age < 365 days (-20)".to_string());
        }
    }

    if let Some(registrar) = &signals.whois.registrar {
        if registrar.to_lowercase().contains("privacy") {
            score -= 10;
            deductions.push("Registrar contains 'privacy' (-10)".to_string());
        }
    }

    if !signals.safe_browsing_matches.is_empty() {
        score -= 50;
        deductions.push("Flagged by Google Safe Browsing (-50)".to_string());
    }

    if !signals.ssl_valid {
        score -= 20;
        deductions.push("SSL certificate missing or invalid (-20)".to_string());
    }

    check_content_keywords(&request.page_content, &mut score, &mut deductions);
    check_url_patterns(&request.url, &mut score, &mut deductions);

    let abuse = signals.ip_reputation.abuse_confidence_score;
    if abuse > 0 {
        let amount = (abuse / 5).min(40) as i32;
        score -= amount;
        deductions.push(format!("IP flagged with abuse score {abuse} (-{amount})"));
    }

    // Email-auth posture only matters for destinations claiming to be secure.
    if request.url.starts_with("https://") {
        if !signals.dns_auth.has_spf {
            score -= 10;
            deductions.push("Missing SPF record (-10)".to_string());
        }
        if !signals.dns_auth.has_dmarc {
            score -= 15;
            deductions.push("Missing DMARC record (-15)".to_string());
        }
    }

    if let Some(redirect_type) = request.redirect_type.as_deref() {
        if redirect_type != "None" {
            score -= 15;
            deductions.push(format!(
                "Client-side redirect detected ({redirect_type}) (-15)"
            ));
        }
    }

    if let Some(ai) = &signals.ai {
        if ai.score < 30 {
            score -= 40;
            deductions.push(format!("AI assessment: Very suspicious ({}) (-40)", ai.score));
        } else if ai.score < 60 {
            score -= 20;
            deductions.push(format!("AI assessment: Suspicious ({}) (-20)", ai.score));
        }
        // Scores above 90 are headroom for a future bonus; no change today.
    }

    let reports = signals.report_count;
    if reports >= 100 {
        score -= 30;
        deductions.push(format!("Reported by {reports} users (-30)"));
    } else if reports > 0 {
        score -= 5;
        deductions.push(format!("Reported by {reports} users (-5)"));
    }

    ScoreResult {
        score: score.clamp(0, 100) as u8,
        deductions,
    }
}

fn check_content_keywords(content: &str, score: &mut i32, deductions: &mut Vec<String>) {
    if content.is_empty() {
        return;
    }

    let lowered = content.to_lowercase();
    let found: Vec<&str> = data::suspicious_keywords()
        .iter()
        .copied()
        .filter(|keyword| lowered.contains(keyword))
        .collect();

    if !found.is_empty() {
        let amount = ((found.len() * 5).min(30)) as i32;
        *score -= amount;
        deductions.push(format!(
            "Suspicious keywords found: {} (-{amount})",
            found.join(", ")
        ));
    }
}

/// Structural URL heuristics, each independent. A URL that cannot be parsed
/// short-circuits pattern analysis with a flat −10; the rest of the scoring
/// pipeline still runs.
fn check_url_patterns(raw_url: &str, score: &mut i32, deductions: &mut Vec<String>) {
    let parsed = match url::Url::parse(raw_url) {
        Ok(parsed) => parsed,
        Err(_) => {
            *score -= 10;
            deductions.push("Malformed or unparseable URL (-10)".to_string());
            return;
        }
    };

    let hostname = parsed.host_str().unwrap_or("").to_lowercase();
    let path = parsed.path();

    if IPV4_HOST.is_match(&hostname) {
        *score -= 30;
        deductions.push("IP address in hostname (-30)".to_string());
    }

    let dot_count = hostname.matches('.').count();
    if dot_count > 3 {
        *score -= 15;
        deductions.push("Excessive subdomains (-15)".to_string());
    }

    let tld = format!(".{}", hostname.rsplit('.').next().unwrap_or(""));
    if data::suspicious_tlds().contains(&tld.as_str()) {
        *score -= 10;
        deductions.push(format!("Suspicious TLD ({tld}) (-10)"));
    }

    if hostname.starts_with("xn--") {
        *score -= 25;
        deductions.push("Punycode (IDN Homograph) detected (-25)".to_string());
    }

    let has_long_segment = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .any(|segment| segment.len() > 30 && LONG_ALNUM_SEGMENT.is_match(segment));
    if has_long_segment {
        *score -= 10;
        deductions.push("Long/random path segment (-10)".to_string());
    }

    let lowered_path = path.to_lowercase();
    let has_path_keyword = data::phishing_path_keywords()
        .iter()
        .any(|keyword| lowered_path.contains(keyword));
    if has_path_keyword {
        let base = base_domain(&hostname);
        if !data::trusted_base_domains().contains(&base.as_str()) {
            *score -= 5;
            deductions.push("Common phishing keyword in path (-5)".to_string());
        }
    }
}
