// Test doubles for the transport and port store ports
use crate::application::gateway::ClientGateway;
use crate::application::notifier::NotificationCenter;
use crate::application::port_store::PortStore;
use crate::application::transport::{
    BackendRequest, BackendResponse, Method, Transport, TransportError,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TEST_BASE: &str = "http://localhost:5000";

struct Reply {
    result: Result<BackendResponse, String>,
    delay: Option<Duration>,
}

/// Scripted backend. Replies are queued per route; the last one sticks.
#[derive(Default)]
pub struct FakeTransport {
    healthy: Mutex<HashSet<String>>,
    routes: Mutex<HashMap<(Method, String), VecDeque<Reply>>>,
    requests: Mutex<Vec<BackendRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_healthy(&self, base: &str) {
        self.healthy.lock().unwrap().insert(base.to_string());
    }

    pub fn respond(&self, method: Method, path: &str, result: Result<BackendResponse, String>) {
        self.enqueue(method, path, Reply { result, delay: None });
    }

    pub fn respond_json(&self, method: Method, path: &str, body: serde_json::Value) {
        self.respond(method, path, Ok(BackendResponse::new(200, body.to_string())));
    }

    pub fn respond_after(
        &self,
        delay: Duration,
        method: Method,
        path: &str,
        result: Result<BackendResponse, String>,
    ) {
        self.enqueue(method, path, Reply { result, delay: Some(delay) });
    }

    fn enqueue(&self, method: Method, path: &str, reply: Reply) {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
    }

    /// Requests seen so far, health probes excluded
    pub fn requests(&self) -> Vec<BackendRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, base: &str, request: BackendRequest) -> Result<BackendResponse, TransportError> {
        if request.path == "/api/health" {
            return if self.healthy.lock().unwrap().contains(base) {
                Ok(BackendResponse::new(200, "ok"))
            } else {
                Err(TransportError::new("connection refused"))
            };
        }

        let key = (request.method, request.path.clone());
        self.requests.lock().unwrap().push(request);

        let (result, delay) = {
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(&key) {
                Some(queue) if queue.len() > 1 => {
                    let reply = queue.pop_front().unwrap();
                    (reply.result, reply.delay)
                }
                Some(queue) if !queue.is_empty() => {
                    let reply = &queue[0];
                    (reply.result.clone(), reply.delay)
                }
                _ => (Ok(BackendResponse::new(404, "")), None),
            }
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result.map_err(TransportError::new)
    }
}

#[derive(Default)]
pub struct MemoryPortStore {
    port: Mutex<Option<u16>>,
    saved: Mutex<Option<u16>>,
}

impl MemoryPortStore {
    pub fn with_port(port: u16) -> Self {
        Self {
            port: Mutex::new(Some(port)),
            saved: Mutex::new(None),
        }
    }

    pub fn saved(&self) -> Option<u16> {
        *self.saved.lock().unwrap()
    }
}

#[async_trait]
impl PortStore for MemoryPortStore {
    async fn load(&self) -> Option<u16> {
        *self.port.lock().unwrap()
    }

    async fn save(&self, port: u16) -> anyhow::Result<()> {
        *self.port.lock().unwrap() = Some(port);
        *self.saved.lock().unwrap() = Some(port);
        Ok(())
    }
}

/// Gateway already adopted on [`TEST_BASE`]
pub async fn connected_gateway() -> (Arc<ClientGateway>, Arc<FakeTransport>, Arc<NotificationCenter>) {
    let transport = Arc::new(FakeTransport::new());
    transport.set_healthy(TEST_BASE);
    let notifier = Arc::new(NotificationCenter::new());
    let gateway = Arc::new(ClientGateway::new(
        transport.clone(),
        notifier.clone(),
        Arc::new(MemoryPortStore::default()),
        "localhost".to_string(),
        5000,
    ));
    assert!(gateway.initialize().await);
    (gateway, transport, notifier)
}
