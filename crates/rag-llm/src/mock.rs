//! Scripted judge for tests and offline runs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use rag_core::{Judge, JudgeError};

type Responder = Box<dyn Fn(&str) -> Result<String, JudgeError> + Send + Sync>;

enum Behavior {
    Respond(Responder),
    Hang,
}

/// A judge whose replies are scripted by the test.
pub struct MockJudge {
    behavior: Behavior,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl MockJudge {
    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    /// Always reply with `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::from_fn(move |_| Ok(text.clone()))
    }

    /// Always fail with `error`.
    pub fn failing(error: JudgeError) -> Self {
        Self::from_fn(move |_| Err(error.clone()))
    }

    /// Never complete.
    pub fn hanging() -> Self {
        Self::with_behavior(Behavior::Hang)
    }

    /// Compute the reply from the prompt.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&str) -> Result<String, JudgeError> + Send + Sync + 'static,
    {
        Self::with_behavior(Behavior::Respond(Box::new(f)))
    }

    /// Number of calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent prompt received.
    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt
            .lock()
            .map(|prompt| prompt.clone())
            .unwrap_or(None)
    }
}

#[async_trait]
impl Judge for MockJudge {
    async fn complete(&self, prompt: &str, _max_tokens: u32) -> Result<String, JudgeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_prompt.lock() {
            *last = Some(prompt.to_string());
        }

        match &self.behavior {
            Behavior::Respond(f) => f(prompt),
            Behavior::Hang => std::future::pending().await,
        }
    }

    fn model(&self) -> &str {
        "mock"
    }
}
