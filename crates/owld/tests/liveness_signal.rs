//! Keepalive datagrams emitted by a running server.

mod support;

use std::net::UdpSocket;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use owl_config::Endpoint;
use owld::dispatch::ApiContext;
use owld::blackboard::UnconfiguredStore;
use owld::liveness::{DATAGRAM_LEN, DC_CHILDALIVE, UdpLivenessSink};
use owld::worker::WorkerSettings;
use owld::{Server, StructuredHealthReporter};

use support::{FakeScheduler, loopback_config};

fn word(datagram: &[u8], index: usize) -> u64 {
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&datagram[index * 8..(index + 1) * 8]);
    u64::from_be_bytes(bytes)
}

#[test]
fn server_sends_periodic_keepalives() {
    let monitor = UdpSocket::bind(("127.0.0.1", 0)).expect("bind monitor");
    monitor
        .set_read_timeout(Some(Duration::from_millis(500)))
        .expect("set read timeout");
    let port = monitor.local_addr().expect("monitor addr").port();
    let sink = UdpLivenessSink::connect(&Endpoint::new("127.0.0.1", port)).expect("sink");

    let interval = Duration::from_millis(100);
    let settings = WorkerSettings {
        queue_timeout: Duration::from_millis(1),
        loop_pause: Duration::from_millis(1),
        liveness_interval: interval,
        liveness_timeout: Duration::from_secs(7),
    };
    let context = ApiContext::new(
        Arc::new(FakeScheduler::new(&[])),
        Arc::new(UnconfiguredStore),
    );
    let started = Instant::now();
    let server = Server::new(
        &loopback_config(),
        context,
        Arc::new(StructuredHealthReporter::new()),
    )
    .with_settings(settings)
    .with_liveness_sink(Box::new(sink))
    .start()
    .expect("server should start");

    thread::sleep(Duration::from_millis(650));
    server.shutdown();
    let run_time = started.elapsed();
    let summary = server.join().expect("server join");

    let mut buffer = [0_u8; 64];
    let mut received = 0_u64;
    while let Ok((len, _)) = monitor.recv_from(&mut buffer) {
        assert_eq!(len, DATAGRAM_LEN);
        assert_eq!(word(&buffer, 0), DC_CHILDALIVE);
        assert_eq!(word(&buffer, 1), u64::from(std::process::id()));
        assert_eq!(word(&buffer, 2), 7);
        received += 1;
    }

    let expected = u64::try_from(run_time.as_millis() / interval.as_millis()).expect("small count");
    assert_eq!(received, summary.heartbeats);
    assert!(
        summary.heartbeats + 1 >= expected && summary.heartbeats <= expected + 1,
        "{} keepalives over {run_time:?}, expected {expected} +/- 1",
        summary.heartbeats
    );
}
