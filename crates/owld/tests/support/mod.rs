//! Helpers shared by the daemon integration tests.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use owl_config::Config;
use owld::dispatch::ApiContext;
use owld::scheduler::{
    ClassAd, JobAction, JobId, JobTarget, Scheduler, SchedulerError, parse_classads,
};
use owld::{Server, ServerHandle, StructuredHealthReporter};
use serde_json::Value;

/// Scheduler answering pool queries from canned ads.
pub struct FakeScheduler {
    ads: Vec<ClassAd>,
}

impl FakeScheduler {
    pub fn new(names: &[&str]) -> Self {
        let text = names
            .iter()
            .map(|name| format!("Name = \"{name}\"\nCpus = 4\n"))
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            ads: parse_classads(&text).expect("canned ads"),
        }
    }
}

impl Scheduler for FakeScheduler {
    fn pool(&self) -> Result<Vec<ClassAd>, SchedulerError> {
        Ok(self.ads.clone())
    }

    fn machine(&self, name: &str) -> Result<Option<ClassAd>, SchedulerError> {
        Ok(self.ads.iter().find(|ad| ad.name() == Some(name)).cloned())
    }

    fn schedd_stats(&self) -> Result<ClassAd, SchedulerError> {
        Ok(ClassAd::new())
    }

    fn control(&self, _action: JobAction, _target: &JobTarget) -> Result<i64, SchedulerError> {
        Ok(0)
    }

    fn set_priority(&self, _priority: u32, _target: &JobTarget) -> Result<i64, SchedulerError> {
        Ok(0)
    }

    fn priority(&self, _job: &JobId) -> Result<Option<i64>, SchedulerError> {
        Ok(Some(0))
    }
}

/// Configuration listening on an ephemeral loopback port.
pub fn loopback_config() -> Config {
    Config {
        listen_host: "127.0.0.1".to_owned(),
        listen_port: 0,
        ..Config::default()
    }
}

/// Starts a server without keepalives.
pub fn start_server(config: &Config, context: ApiContext) -> ServerHandle {
    Server::new(config, context, Arc::new(StructuredHealthReporter::new()))
        .without_liveness()
        .start()
        .expect("server should start")
}

/// Sends one raw request line and returns the decoded reply.
pub fn send_line(addr: SocketAddr, line: &[u8]) -> Value {
    let mut stream = TcpStream::connect(addr).expect("connect to daemon");
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .expect("set read timeout");
    stream.write_all(line).expect("write request");
    stream.write_all(b"\n").expect("write terminator");
    let mut raw = String::new();
    stream.read_to_string(&mut raw).expect("read reply");
    assert!(raw.ends_with('\n'), "reply should be newline terminated: {raw:?}");
    serde_json::from_str(raw.trim_end()).expect("reply should be JSON")
}

/// Sends a request value and returns the decoded reply.
pub fn call(addr: SocketAddr, request: &Value) -> Value {
    send_line(addr, request.to_string().as_bytes())
}
