#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use cctv_dashboard::fetch::AuthFetch;
use cctv_dashboard::{Error, Result};
use serde_json::{json, Value};

pub const API: &str = "https://api.test";
pub const CDN: &str = "https://cdn.test/";

pub fn caption_url() -> String {
    format!("{}/caption", API)
}

pub fn prompts_url() -> String {
    format!("{}/prompts", API)
}

pub fn prompt_url() -> String {
    format!("{}/prompt", API)
}

/// A caption item the way the BFF returns it.
pub fn status_item(caption: &str, classification: &str) -> Value {
    json!({
        "caption": {"S": caption},
        "rekognition_labels": {"S": "{'Labels': [{'Name': 'Person'}, {'Name': 'Helmet'}]}"},
        "classification": {"S": classification},
        "risk_level": {"N": "7"},
        "timestamp": {"N": "1735600000"},
        "s3_location": {"S": "bucket/path/frame42.jpg"}
    })
}

pub fn malformed_item() -> Value {
    json!({
        "caption": {"S": "should never be shown"},
        "rekognition_labels": {"S": "{'Labels': [{'Name': "},
        "classification": {"S": "1"}
    })
}

pub struct Scripted {
    pub delay: Duration,
    pub body: std::result::Result<Value, Error>,
}

impl Scripted {
    pub fn ok(body: Value) -> Self {
        Self {
            delay: Duration::ZERO,
            body: Ok(body),
        }
    }

    pub fn delayed(delay: Duration, body: Value) -> Self {
        Self {
            delay,
            body: Ok(body),
        }
    }

    pub fn network_error() -> Self {
        Self {
            delay: Duration::ZERO,
            body: Err(Error::Network("connection reset".into())),
        }
    }
}

/// In-memory stand-in for the HTTP API behind the bearer-token fetch.
pub struct FakeApi {
    pub caption_calls: AtomicUsize,
    pub prompt_gets: AtomicUsize,
    scripted: Mutex<VecDeque<Scripted>>,
    default_caption: Value,
    prompt_ids: Vec<String>,
    selected: Mutex<Option<String>>,
    pub puts: Mutex<Vec<(String, Value)>>,
    pub fail_puts: Mutex<bool>,
    pub fail_prompt_gets: Mutex<bool>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            caption_calls: AtomicUsize::new(0),
            prompt_gets: AtomicUsize::new(0),
            scripted: Mutex::new(VecDeque::new()),
            default_caption: status_item("All clear.", "0"),
            prompt_ids: vec!["fire".into(), "safety".into()],
            selected: Mutex::new(Some("fire".into())),
            puts: Mutex::new(Vec::new()),
            fail_puts: Mutex::new(false),
            fail_prompt_gets: Mutex::new(false),
        }
    }

    pub fn script(&self, response: Scripted) {
        self.scripted.lock().unwrap().push_back(response);
    }

    pub fn caption_calls(&self) -> usize {
        self.caption_calls.load(Ordering::SeqCst)
    }

    pub fn prompt_gets(&self) -> usize {
        self.prompt_gets.load(Ordering::SeqCst)
    }

    pub fn put_bodies(&self) -> Vec<Value> {
        self.puts
            .lock()
            .unwrap()
            .iter()
            .map(|(_, body)| body.clone())
            .collect()
    }
}

#[async_trait]
impl AuthFetch for FakeApi {
    async fn get_json(&self, url: &str) -> Result<Value> {
        if url == caption_url() {
            self.caption_calls.fetch_add(1, Ordering::SeqCst);
            let next = self.scripted.lock().unwrap().pop_front();
            return match next {
                Some(scripted) => {
                    if !scripted.delay.is_zero() {
                        tokio::time::sleep(scripted.delay).await;
                    }
                    scripted.body
                }
                None => Ok(self.default_caption.clone()),
            };
        }

        if url == prompts_url() {
            self.prompt_gets.fetch_add(1, Ordering::SeqCst);
            if *self.fail_prompt_gets.lock().unwrap() {
                return Err(Error::Network("prompts unavailable".into()));
            }
            let prompts: Vec<Value> = self.prompt_ids.iter().map(|id| json!({"id": id})).collect();
            return Ok(json!({
                "selectedId": self.selected.lock().unwrap().clone(),
                "prompts": prompts
            }));
        }

        Err(Error::Api {
            status: 404,
            body: format!("no route for {}", url),
        })
    }

    async fn put_json(&self, url: &str, body: &Value) -> Result<Value> {
        if *self.fail_puts.lock().unwrap() {
            return Err(Error::Auth("session expired".into()));
        }

        self.puts.lock().unwrap().push((url.to_string(), body.clone()));
        let selected = body["selectedId"].as_str().map(String::from);
        *self.selected.lock().unwrap() = selected.clone();

        Ok(json!({ "selectedId": selected }))
    }
}
