//! Prometheus exporter bound on its own listener, separate from the data
//! plane so scraping never competes with PUT/GET traffic.

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusBuilder;

pub fn install(addr: &str) -> Result<()> {
    let addr: std::net::SocketAddr = addr.parse()?;
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    Ok(())
}
