pub mod scan;
pub mod score;

use phishershield_core::verdict::ScanVerdict;

/// Print a verdict (JSON to stdout, human summary to stderr) and map it to
/// a process exit code: 0 safe, 2 suspicious.
pub(crate) fn print_verdict(url: &str, verdict: &ScanVerdict, json: bool) -> i32 {
    if json {
        #[derive(serde::Serialize)]
        struct ScanOutput<'a> {
            url: &'a str,
            #[serde(flatten)]
            verdict: &'a ScanVerdict,
        }

        let out = ScanOutput { url, verdict };
        let _ = serde_json::to_writer_pretty(std::io::stdout().lock(), &out);
        println!();
    } else {
        eprintln!(
            "phishershield: {url} — trust score: {}/100",
            verdict.trust_score
        );
        eprintln!("  {}", verdict.alert_message);
        for deduction in &verdict.deductions {
            eprintln!("  - {deduction}");
        }
    }

    if verdict.is_suspicious() {
        2
    } else {
        0
    }
}

pub(crate) fn http_client() -> Option<reqwest::Client> {
    match reqwest::Client::builder()
        .connect_timeout(std::time::Duration::from_secs(5))
        .timeout(std::time::Duration::from_secs(20))
        .build()
    {
        Ok(client) => Some(client),
        Err(e) => {
            eprintln!("phishershield: failed to build HTTP client: {e}");
            None
        }
    }
}
