//! Application metrics collection and reporting.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Metrics collector for the drought API.
#[derive(Debug)]
pub struct MetricsCollector {
    /// Request counts
    pub map_requests: AtomicU64,
    pub legend_requests: AtomicU64,

    /// Render stats
    pub renders_total: AtomicU64,
    pub render_errors: AtomicU64,

    /// Render cache stats
    pub cache_hits: AtomicU64,
    pub cache_misses: AtomicU64,

    /// Start time for uptime calculation
    start_time: Instant,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            map_requests: AtomicU64::new(0),
            legend_requests: AtomicU64::new(0),
            renders_total: AtomicU64::new(0),
            render_errors: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Render metrics in Prometheus text exposition format.
    pub fn render_prometheus(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "# HELP map_requests_total Total map overlay requests\n# TYPE map_requests_total counter\nmap_requests_total {}\n",
            self.map_requests.load(Ordering::Relaxed)
        ));
        output.push_str(&format!(
            "# HELP legend_requests_total Total legend requests\n# TYPE legend_requests_total counter\nlegend_requests_total {}\n",
            self.legend_requests.load(Ordering::Relaxed)
        ));
        output.push_str(&format!(
            "# HELP renders_total Total overlay renders\n# TYPE renders_total counter\nrenders_total {}\n",
            self.renders_total.load(Ordering::Relaxed)
        ));
        output.push_str(&format!(
            "# HELP render_errors_total Total failed renders\n# TYPE render_errors_total counter\nrender_errors_total {}\n",
            self.render_errors.load(Ordering::Relaxed)
        ));
        output.push_str(&format!(
            "# HELP render_cache_hits Total render cache hits\n# TYPE render_cache_hits counter\nrender_cache_hits {}\n",
            self.cache_hits.load(Ordering::Relaxed)
        ));
        output.push_str(&format!(
            "# HELP render_cache_misses Total render cache misses\n# TYPE render_cache_misses counter\nrender_cache_misses {}\n",
            self.cache_misses.load(Ordering::Relaxed)
        ));
        output.push_str(&format!(
            "# HELP uptime_seconds Service uptime in seconds\n# TYPE uptime_seconds gauge\nuptime_seconds {}\n",
            self.uptime_seconds()
        ));

        output
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prometheus_output_contains_counters() {
        let metrics = MetricsCollector::new();
        metrics.map_requests.fetch_add(3, Ordering::Relaxed);
        metrics.render_errors.fetch_add(1, Ordering::Relaxed);

        let output = metrics.render_prometheus();
        assert!(output.contains("map_requests_total 3"));
        assert!(output.contains("render_errors_total 1"));
        assert!(output.contains("# TYPE uptime_seconds gauge"));
    }
}
