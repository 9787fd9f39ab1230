use std::{
    fmt::Debug,
    net::{SocketAddr, TcpStream},
    time::Duration,
};

/// Connectivity signal, sampled by the controller at each fetch. A
/// transition never triggers a fetch by itself; it only decides whether
/// the next fetch goes to the provider or to the cache.
pub trait ConnectivityMonitor: Send + Sync + Debug {
    fn is_online(&self) -> bool;
}

const PROBE_ADDR: ([u8; 4], u16) = ([1, 1, 1, 1], 53);
const PROBE_TIMEOUT: Duration = Duration::from_millis(1500);

/// Connectivity check via a short TCP dial to a public resolver.
#[derive(Debug)]
pub struct ProbeConnectivity {
    addr: SocketAddr,
    timeout: Duration,
}

impl ProbeConnectivity {
    pub fn new(addr: SocketAddr, timeout: Duration) -> Self {
        Self { addr, timeout }
    }
}

impl Default for ProbeConnectivity {
    fn default() -> Self {
        Self::new(SocketAddr::from(PROBE_ADDR), PROBE_TIMEOUT)
    }
}

impl ConnectivityMonitor for ProbeConnectivity {
    fn is_online(&self) -> bool {
        TcpStream::connect_timeout(&self.addr, self.timeout).is_ok()
    }
}
