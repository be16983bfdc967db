use phishershield_core::gateway::ScanService;
use phishershield_core::signals::{CollectorConfig, Collectors};
use phishershield_core::verdict::ScanRequest;

use super::{http_client, print_verdict};

pub async fn run(url: &str, json: bool) -> i32 {
    let Some(client) = http_client() else {
        return 1;
    };

    let collectors = Collectors::from_config(&CollectorConfig::from_env(), client);
    let service = ScanService::new(collectors);
    let verdict = service.scan(&ScanRequest::pre_load(url)).await;

    print_verdict(url, &verdict, json)
}
