use std::net::SocketAddr;

use crate::pipeline::planner::DISTRIBUTION_FANOUT;
use crate::store::DEFAULT_MAX_ASSIGNMENTS;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    /// Number of agents that participate in each distribution.
    pub fanout: usize,
    /// Maximum number of assignments the store will hold.
    pub store_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            // SAFETY: This is a hardcoded valid address that will always parse
            listen_addr: "127.0.0.1:5000"
                .parse()
                .expect("default listen address is valid"),
            fanout: DISTRIBUTION_FANOUT,
            store_capacity: DEFAULT_MAX_ASSIGNMENTS,
        }
    }
}

impl AppConfig {
    pub fn new(listen_addr: SocketAddr) -> Self {
        Self {
            listen_addr,
            ..Default::default()
        }
    }

    pub fn with_fanout(mut self, fanout: usize) -> Self {
        self.fanout = fanout;
        self
    }

    pub fn with_store_capacity(mut self, capacity: usize) -> Self {
        self.store_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_config_default() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.listen_addr.to_string(), "127.0.0.1:5000");
        assert_eq!(cfg.fanout, DISTRIBUTION_FANOUT);
        assert_eq!(cfg.store_capacity, DEFAULT_MAX_ASSIGNMENTS);
    }

    #[test]
    fn app_config_new() {
        let addr: SocketAddr = "10.0.0.1:9000".parse().unwrap();
        let cfg = AppConfig::new(addr);
        assert_eq!(cfg.listen_addr, addr);
        assert_eq!(cfg.fanout, DISTRIBUTION_FANOUT);
    }

    #[test]
    fn app_config_builders() {
        let cfg = AppConfig::default().with_fanout(3).with_store_capacity(100);
        assert_eq!(cfg.fanout, 3);
        assert_eq!(cfg.store_capacity, 100);
    }
}
