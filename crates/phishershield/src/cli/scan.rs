use phishershield_core::config::ShieldConfig;
use phishershield_core::gateway::{HttpScanGateway, ScanGateway};
use phishershield_core::verdict::ScanRequest;

use super::{http_client, print_verdict};

pub async fn run(url: &str, server: Option<&str>, json: bool) -> i32 {
    let Some(client) = http_client() else {
        return 1;
    };

    let config = ShieldConfig::from_env();
    let base_url = server.unwrap_or(&config.gateway_base_url);
    let gateway = HttpScanGateway::new(base_url, client);
    let verdict = gateway.scan(&ScanRequest::pre_load(url)).await;

    print_verdict(url, &verdict, json)
}
