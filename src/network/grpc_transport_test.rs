use std::time::Duration;

use super::*;
use crate::proto::AppendLogRequest;
use crate::Error;
use crate::NetworkConfig;
use crate::SystemError;

fn unroutable_addr() -> NodeAddr {
    // Port 1 on loopback: nothing listens there, connect fails fast.
    NodeAddr::new("127.0.0.1", 1)
}

#[test]
fn test_node_addr_display_and_uri() {
    let addr = NodeAddr::new("10.0.0.3", 9780);
    assert_eq!(addr.to_string(), "10.0.0.3:9780");
    assert_eq!(addr.uri(), "http://10.0.0.3:9780");
}

#[tokio::test]
async fn test_append_log_to_unreachable_peer_is_network_error() {
    let transport = GrpcTransport::new(NetworkConfig::default());

    let result = transport
        .append_log(
            &unroutable_addr(),
            AppendLogRequest::default(),
            Duration::from_millis(200),
        )
        .await;

    assert!(matches!(
        result,
        Err(Error::System(SystemError::Network(_)))
    ));
}

#[tokio::test]
async fn test_failed_connect_leaves_no_cached_channel() {
    let cache = ConnectionCache::new(NetworkConfig::default());
    let addr = unroutable_addr();

    assert!(cache.get_channel(&addr).await.is_err());
    assert!(!cache.contains(&addr));
}

#[tokio::test]
async fn test_evict_unknown_addr_is_noop() {
    let cache = ConnectionCache::new(NetworkConfig::default());
    cache.evict(&unroutable_addr());
}
