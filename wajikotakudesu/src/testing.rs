//! In-memory [`Transport`] for unit tests

use crate::error::{Error, Result};
use crate::transport::Transport;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const FAKE_BASE_URL: &str = "https://otakudesu.test";

/// Serves canned pages and a queue of canned form answers, counting calls
#[derive(Default)]
pub struct FakeTransport {
    pages: Mutex<HashMap<String, String>>,
    posts: Mutex<VecDeque<Result<serde_json::Value>>>,
    pub fetches: AtomicUsize,
    pub post_calls: AtomicUsize,
    pub sent_forms: Mutex<Vec<Vec<(String, String)>>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, path: &str, html: &str) -> Self {
        self.set_page(path, html);
        self
    }

    pub fn set_page(&self, path: &str, html: &str) {
        self.pages
            .lock()
            .unwrap()
            .insert(path.to_string(), html.to_string());
    }

    pub fn push_post(&self, answer: Result<serde_json::Value>) {
        self.posts.lock().unwrap().push_back(answer);
    }

    pub fn push_status(&self, status: u16) {
        self.push_post(Err(Error::Status {
            status,
            url: "/wp-admin/admin-ajax.php".to_string(),
        }));
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn post_count(&self) -> usize {
        self.post_calls.load(Ordering::SeqCst)
    }

    /// Value of `field` in the n-th posted form
    pub fn form_field(&self, n: usize, field: &str) -> Option<String> {
        self.sent_forms.lock().unwrap().get(n).and_then(|form| {
            form.iter()
                .find(|(k, _)| k == field)
                .map(|(_, v)| v.clone())
        })
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn fetch_page(&self, path: &str) -> Result<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.pages
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| Error::Status {
                status: 404,
                url: path.to_string(),
            })
    }

    async fn post_form(&self, _path: &str, fields: &[(&str, &str)]) -> Result<serde_json::Value> {
        self.post_calls.fetch_add(1, Ordering::SeqCst);
        self.sent_forms.lock().unwrap().push(
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self.posts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::other("no canned answer left")))
    }

    fn base_url(&self) -> &str {
        FAKE_BASE_URL
    }
}
