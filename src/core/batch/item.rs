//! Reader, processor and writer seams of a chunk-oriented step

use crate::domain::Result;
use async_trait::async_trait;

/// Produces one record per call until exhausted
///
/// Implementations are opened once before the first read and closed once
/// after the last, whether the step succeeded or not.
#[async_trait]
pub trait ItemReader<T>: Send {
    /// Acquire the underlying resource
    async fn open(&mut self) -> Result<()> {
        Ok(())
    }

    /// Next record, or `None` once the source is exhausted
    async fn read(&mut self) -> Result<Option<T>>;

    /// Release the underlying resource
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Transforms a single record before it joins a chunk
#[async_trait]
pub trait ItemProcessor<T>: Send + Sync {
    /// Transform one record
    async fn process(&self, item: T) -> Result<T>;
}

/// Persists a whole chunk atomically
///
/// `write` either persists every record of the chunk or none of them.
#[async_trait]
pub trait ItemWriter<T>: Send {
    /// Acquire the underlying resource
    async fn open(&mut self) -> Result<()> {
        Ok(())
    }

    /// Persist the chunk
    async fn write(&mut self, chunk: &[T]) -> Result<()>;

    /// Release the underlying resource
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Identity transform
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughProcessor;

#[async_trait]
impl<T: Send + 'static> ItemProcessor<T> for PassThroughProcessor {
    async fn process(&self, item: T) -> Result<T> {
        Ok(item)
    }
}

/// Adapts a synchronous closure into an [`ItemProcessor`]
pub struct FnProcessor<F> {
    f: F,
}

impl<F> FnProcessor<F> {
    /// Wrap a closure
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<T, F> ItemProcessor<T> for FnProcessor<F>
where
    T: Send + 'static,
    F: Fn(T) -> Result<T> + Send + Sync,
{
    async fn process(&self, item: T) -> Result<T> {
        (self.f)(item)
    }
}
