#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use routekit::middleware::Middleware;
use routekit::{Callback, Request, Response};

/// Shared log of middleware and handler events
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn events(log: &EventLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Middleware that records `<label>:before` and `<label>:after`
pub struct Recorder {
    pub label: &'static str,
    pub log: EventLog,
    pub short_circuit: Option<u16>,
}

impl Recorder {
    pub fn new(label: &'static str, log: &EventLog) -> Arc<dyn Middleware> {
        Arc::new(Self {
            label,
            log: Arc::clone(log),
            short_circuit: None,
        })
    }

    pub fn rejecting(label: &'static str, log: &EventLog, status: u16) -> Arc<dyn Middleware> {
        Arc::new(Self {
            label,
            log: Arc::clone(log),
            short_circuit: Some(status),
        })
    }
}

impl Middleware for Recorder {
    fn before(&self, _req: &Request) -> Option<Response> {
        self.log.lock().unwrap().push(format!("{}:before", self.label));
        self.short_circuit
            .map(|status| Response::error(status, self.label))
    }

    fn after(&self, _req: &Request, _res: &mut Response, _latency: Duration) {
        self.log.lock().unwrap().push(format!("{}:after", self.label));
    }
}

/// Handler that records `handler` and echoes its sorted arguments as the body
pub fn recording_handler(log: &EventLog) -> Callback {
    let log = Arc::clone(log);
    Callback::handler(move |_req, res, args| {
        log.lock().unwrap().push("handler".to_string());
        let mut args: Vec<_> = args.iter().collect();
        args.sort();
        res.with_body(serde_json::json!(args))
    })
}

pub fn ok_handler() -> Callback {
    Callback::handler(|_req, res, _args| res)
}

pub fn noop_group() -> Callback {
    Callback::group(|_router, _group, _binding| Ok(()))
}
