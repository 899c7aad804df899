//! Cover job queue: a single worker consuming `GenerateCover` messages.
//!
//! Every job reports a [`CoverOutcome`], both to the dispatcher (one-shot)
//! and to anyone subscribed to the outcome broadcast.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::{broadcast, mpsc, oneshot};

use super::cover::CoverGenerator;
use crate::domain::{BookRepository, DomainError};

const OUTCOME_BROADCAST_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateCover {
    pub book_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CoverOutcome {
    Completed { book_id: String },
    Failed { book_id: String, reason: String },
}

impl CoverOutcome {
    pub fn book_id(&self) -> &str {
        match self {
            CoverOutcome::Completed { book_id } | CoverOutcome::Failed { book_id, .. } => book_id,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, CoverOutcome::Completed { .. })
    }
}

struct Envelope {
    job: GenerateCover,
    reply: oneshot::Sender<CoverOutcome>,
}

#[derive(Clone)]
pub struct CoverQueue {
    sender: mpsc::Sender<Envelope>,
    outcomes: broadcast::Sender<CoverOutcome>,
    dispatched: Arc<AtomicU64>,
}

impl CoverQueue {
    /// Spawn the worker on the current tokio runtime
    pub fn start(
        books: Arc<dyn BookRepository>,
        generator: Arc<CoverGenerator>,
        capacity: usize,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let (outcomes, _) = broadcast::channel(OUTCOME_BROADCAST_CAPACITY);

        tokio::spawn(run_worker(receiver, books, generator, outcomes.clone()));

        Self {
            sender,
            outcomes,
            dispatched: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Enqueue a job; the receiver resolves once the worker has handled it
    pub async fn dispatch(
        &self,
        job: GenerateCover,
    ) -> Result<oneshot::Receiver<CoverOutcome>, DomainError> {
        let (reply, outcome) = oneshot::channel();

        self.sender
            .send(Envelope { job, reply })
            .await
            .map_err(|_| DomainError::Unavailable("cover worker has stopped".to_string()))?;

        self.dispatched.fetch_add(1, Ordering::SeqCst);
        Ok(outcome)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CoverOutcome> {
        self.outcomes.subscribe()
    }

    pub fn dispatched_count(&self) -> u64 {
        self.dispatched.load(Ordering::SeqCst)
    }
}

async fn run_worker(
    mut receiver: mpsc::Receiver<Envelope>,
    books: Arc<dyn BookRepository>,
    generator: Arc<CoverGenerator>,
    outcomes: broadcast::Sender<CoverOutcome>,
) {
    tracing::info!("Cover worker started (meme API: {})", generator.endpoint());

    while let Some(Envelope { job, reply }) = receiver.recv().await {
        let outcome = process_job(books.as_ref(), &generator, &job).await;

        // Nobody listening is fine for both channels
        let _ = outcomes.send(outcome.clone());
        let _ = reply.send(outcome);
    }

    tracing::info!("Cover worker stopped");
}

/// Load the book, generate its cover and persist it
pub async fn process_job(
    books: &dyn BookRepository,
    generator: &CoverGenerator,
    job: &GenerateCover,
) -> CoverOutcome {
    let failed = |reason: String| CoverOutcome::Failed {
        book_id: job.book_id.clone(),
        reason,
    };

    let mut book = match books.find_by_id(&job.book_id).await {
        Ok(Some(book)) => book,
        Ok(None) => {
            tracing::warn!("Cover requested for unknown book {}", job.book_id);
            return failed(DomainError::NotFound.to_string());
        }
        Err(e) => {
            tracing::error!("Cannot load book {} for cover: {}", job.book_id, e);
            return failed(e.to_string());
        }
    };

    if let Err(e) = generator.generate(&mut book).await {
        tracing::error!("Cover generation failed for book {}: {}", job.book_id, e);
        return failed(e.to_string());
    }

    if let Err(e) = books.set_cover(&book.id, book.cover.clone()).await {
        tracing::error!("Cannot save cover of book {}: {}", job.book_id, e);
        return failed(e.to_string());
    }

    tracing::info!("Cover generated for book {}", job.book_id);
    CoverOutcome::Completed {
        book_id: job.book_id.clone(),
    }
}
