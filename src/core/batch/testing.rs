//! In-crate test doubles for readers and writers

use super::item::{ItemReader, ItemWriter};
use crate::domain::{FerryError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Reader over a fixed list
pub struct VecReader<T> {
    items: VecDeque<T>,
}

impl<T> VecReader<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: items.into(),
        }
    }
}

#[async_trait]
impl<T: Send + 'static> ItemReader<T> for VecReader<T> {
    async fn read(&mut self) -> Result<Option<T>> {
        Ok(self.items.pop_front())
    }
}

/// Writer remembering every chunk it was handed
#[derive(Default)]
pub struct RecordingWriter<T> {
    pub chunks: Vec<Vec<T>>,
}

#[async_trait]
impl<T: Clone + Send + Sync + 'static> ItemWriter<T> for RecordingWriter<T> {
    async fn write(&mut self, chunk: &[T]) -> Result<()> {
        self.chunks.push(chunk.to_vec());
        Ok(())
    }
}

/// Writer that rejects its n-th call
pub struct FailingWriter<T> {
    fail_on: usize,
    calls: usize,
    pub committed: Vec<Vec<T>>,
}

impl<T> FailingWriter<T> {
    pub fn failing_on_call(fail_on: usize) -> Self {
        Self {
            fail_on,
            calls: 0,
            committed: Vec::new(),
        }
    }
}

#[async_trait]
impl<T: Clone + Send + Sync + 'static> ItemWriter<T> for FailingWriter<T> {
    async fn write(&mut self, chunk: &[T]) -> Result<()> {
        self.calls += 1;
        if self.calls == self.fail_on {
            return Err(FerryError::Validation(format!(
                "write {} rejected",
                self.calls
            )));
        }
        self.committed.push(chunk.to_vec());
        Ok(())
    }
}

/// Cloneable writer whose output outlives the step that owned it
pub struct SharedWriter<T> {
    items: Arc<Mutex<Vec<T>>>,
    closed: Arc<Mutex<bool>>,
}

impl<T> Default for SharedWriter<T> {
    fn default() -> Self {
        Self {
            items: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(Mutex::new(false)),
        }
    }
}

impl<T> Clone for SharedWriter<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            closed: Arc::clone(&self.closed),
        }
    }
}

impl<T: Clone> SharedWriter<T> {
    pub async fn items(&self) -> Vec<T> {
        self.items.lock().await.clone()
    }

    pub async fn closed(&self) -> bool {
        *self.closed.lock().await
    }
}

#[async_trait]
impl<T: Clone + Send + Sync + 'static> ItemWriter<T> for SharedWriter<T> {
    async fn write(&mut self, chunk: &[T]) -> Result<()> {
        self.items.lock().await.extend_from_slice(chunk);
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        *self.closed.lock().await = true;
        Ok(())
    }
}
