//! Process-lifetime cache of finished question batches.
//!
//! Concurrent requests for the same fingerprint may both compute; the last
//! `put` wins. Entries never expire, but the store is bounded (LRU).

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Difficulty, Question};
use crate::util::{fingerprint, take_chars};

#[async_trait]
pub trait QuizCache: Send + Sync {
  async fn get(&self, key: &str) -> Option<Vec<Question>>;
  async fn put(&self, key: String, batch: Vec<Question>);
}

/// Fingerprint of `(text prefix, count, difficulty)`.
pub fn cache_key(text: &str, prefix_chars: usize, count: usize, difficulty: Difficulty) -> String {
  let count = count.to_string();
  fingerprint(&[take_chars(text, prefix_chars), count.as_str(), difficulty.as_str()])
}

pub struct LruQuizCache {
  capacity: usize,
  inner: Mutex<LruInner>,
}

#[derive(Default)]
struct LruInner {
  entries: HashMap<String, Vec<Question>>,
  // Front = least recently used.
  order: VecDeque<String>,
}

impl LruInner {
  fn touch(&mut self, key: &str) {
    if let Some(pos) = self.order.iter().position(|k| k == key) {
      if let Some(k) = self.order.remove(pos) {
        self.order.push_back(k);
      }
    }
  }
}

impl LruQuizCache {
  pub fn new(capacity: usize) -> Self {
    Self { capacity, inner: Mutex::new(LruInner::default()) }
  }

  pub async fn entry_count(&self) -> usize {
    self.inner.lock().await.entries.len()
  }
}

#[async_trait]
impl QuizCache for LruQuizCache {
  async fn get(&self, key: &str) -> Option<Vec<Question>> {
    let mut inner = self.inner.lock().await;
    let hit = inner.entries.get(key).cloned();
    if hit.is_some() {
      inner.touch(key);
    }
    hit
  }

  async fn put(&self, key: String, batch: Vec<Question>) {
    if self.capacity == 0 {
      return;
    }
    let mut inner = self.inner.lock().await;
    if inner.entries.insert(key.clone(), batch).is_some() {
      inner.touch(&key);
    } else {
      inner.order.push_back(key);
    }
    while inner.entries.len() > self.capacity {
      let Some(oldest) = inner.order.pop_front() else { break };
      inner.entries.remove(&oldest);
    }
  }
}
