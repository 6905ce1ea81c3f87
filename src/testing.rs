//! Test doubles: scripted HTTP transport, manual clock and a local executor.

use async_trait::async_trait;
use futures::channel::oneshot;
use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::Future;
use std::rc::Rc;

use crate::services::transport::{HttpRequest, HttpResponse, HttpTransport, Method};
use crate::utils::clock::Clock;

type TransportResult = Result<HttpResponse, String>;

pub fn block_on<F: Future>(future: F) -> F::Output {
    futures::executor::block_on(future)
}

enum Reply {
    Ready(TransportResult),
    Deferred(oneshot::Receiver<TransportResult>),
}

struct Script {
    method: Method,
    path: String,
    replies: VecDeque<Reply>,
}

/// Replies are matched by method and URL path suffix (query string ignored)
/// and consumed in order; the last ready reply keeps answering.
#[derive(Default)]
pub struct FakeTransport {
    scripts: RefCell<Vec<Script>>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl FakeTransport {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    fn push(&self, method: Method, path: &str, reply: Reply) {
        let mut scripts = self.scripts.borrow_mut();
        match scripts
            .iter_mut()
            .find(|s| s.method == method && s.path == path)
        {
            Some(script) => script.replies.push_back(reply),
            None => scripts.push(Script {
                method,
                path: path.to_string(),
                replies: VecDeque::from([reply]),
            }),
        }
    }

    pub fn reply(&self, method: Method, path: &str, status: u16, body: Value) {
        self.reply_raw(method, path, status, &body.to_string());
    }

    pub fn reply_raw(&self, method: Method, path: &str, status: u16, body: &str) {
        let response = HttpResponse {
            status,
            body: body.to_string(),
        };
        self.push(method, path, Reply::Ready(Ok(response)));
    }

    pub fn fail(&self, method: Method, path: &str, error: &str) {
        self.push(method, path, Reply::Ready(Err(error.to_string())));
    }

    /// Reply that stays pending until the returned handle responds
    pub fn defer(&self, method: Method, path: &str) -> DeferredReply {
        let (sender, receiver) = oneshot::channel();
        self.push(method, path, Reply::Deferred(receiver));
        DeferredReply {
            sender: RefCell::new(Some(sender)),
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.borrow().last().cloned()
    }

    pub fn calls(&self, method: Method, path: &str) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.method == method && path_of(&r.url).ends_with(path))
            .count()
    }

    fn next_reply(&self, request: &HttpRequest) -> Option<Reply> {
        let mut scripts = self.scripts.borrow_mut();
        let script = scripts
            .iter_mut()
            .filter(|s| s.method == request.method && path_of(&request.url).ends_with(&s.path))
            .max_by_key(|s| s.path.len())?;
        if script.replies.len() > 1 {
            return script.replies.pop_front();
        }
        match script.replies.front() {
            Some(Reply::Ready(result)) => Some(Reply::Ready(result.clone())),
            Some(Reply::Deferred(_)) => script.replies.pop_front(),
            None => None,
        }
    }
}

fn path_of(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

#[async_trait(?Send)]
impl HttpTransport for FakeTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, String> {
        self.requests.borrow_mut().push(request.clone());
        let reply = self.next_reply(&request);
        match reply {
            Some(Reply::Ready(result)) => result,
            Some(Reply::Deferred(receiver)) => receiver
                .await
                .unwrap_or_else(|_| Err("deferred reply dropped".to_string())),
            None => Err(format!("no scripted reply for {} {}", request.method, request.url)),
        }
    }
}

pub struct DeferredReply {
    sender: RefCell<Option<oneshot::Sender<TransportResult>>>,
}

impl DeferredReply {
    pub fn respond(&self, status: u16, body: Value) {
        self.send(Ok(HttpResponse {
            status,
            body: body.to_string(),
        }));
    }

    pub fn fail(&self, error: &str) {
        self.send(Err(error.to_string()));
    }

    fn send(&self, result: TransportResult) {
        if let Some(sender) = self.sender.borrow_mut().take() {
            let _ = sender.send(result);
        }
    }
}

#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn set_seconds(&self, seconds: f64) {
        self.now.set(seconds * 1000.0);
    }

    pub fn advance_seconds(&self, seconds: f64) {
        self.now.set(self.now.get() + seconds * 1000.0);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

/// Single-threaded executor for interleaving tests
pub struct LocalRuntime {
    pool: LocalPool,
}

impl LocalRuntime {
    pub fn new() -> Self {
        Self {
            pool: LocalPool::new(),
        }
    }

    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + 'static,
    {
        self.pool
            .spawner()
            .spawn_local(future)
            .expect("spawn on local pool");
    }

    /// Spawns and exposes the output once the task completes
    pub fn spawn_with_result<F>(&self, future: F) -> Rc<RefCell<Option<F::Output>>>
    where
        F: Future + 'static,
    {
        let slot = Rc::new(RefCell::new(None));
        let sink = slot.clone();
        self.spawn(async move {
            let output = future.await;
            *sink.borrow_mut() = Some(output);
        });
        slot
    }

    pub fn run_until_stalled(&mut self) {
        self.pool.run_until_stalled();
    }
}
