//! Host-facing collaborator traits.
//!
//! The engine depends on a transport adapter and a persistence layer but
//! owns neither; hosts provide implementations of these traits.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use taleweaver_core::{ChatRequest, LlmModel, LogEntry, Tale};
use taleweaver_error::TaleweaverResult;

/// A model provider's answer to a chat request.
pub enum ChatReply {
    /// The full response body, for providers without streaming.
    Content(String),
    /// An ordered sequence of raw text fragments. Transport failures and
    /// aborts surface as `Err` items ending the stream.
    Stream(BoxStream<'static, TaleweaverResult<String>>),
}

impl std::fmt::Debug for ChatReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatReply::Content(content) => f.debug_tuple("Content").field(content).finish(),
            ChatReply::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Transport adapter for a model provider.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Issue a chat request and return the provider's reply.
    async fn chat(&self, request: &ChatRequest) -> TaleweaverResult<ChatReply>;

    /// List the models this provider offers.
    async fn models(&self) -> TaleweaverResult<Vec<LlmModel>>;
}

/// Persistence layer for tale aggregates.
///
/// The engine treats storage as opaque: it pages history by index range
/// and saves/loads whole aggregates.
#[async_trait]
pub trait TaleRepository: Send + Sync {
    /// Fetch `count` log entries starting at `start` (oldest first).
    async fn log_entries(
        &self,
        tale_id: &str,
        start: usize,
        count: usize,
    ) -> TaleweaverResult<Vec<LogEntry>>;

    /// Persist the full tale aggregate.
    async fn save(&self, tale: &Tale) -> TaleweaverResult<()>;

    /// Load a tale aggregate by id.
    async fn load(&self, tale_id: &str) -> TaleweaverResult<Tale>;
}

#[async_trait]
impl<T: ChatBackend + ?Sized> ChatBackend for Arc<T> {
    async fn chat(&self, request: &ChatRequest) -> TaleweaverResult<ChatReply> {
        (**self).chat(request).await
    }

    async fn models(&self) -> TaleweaverResult<Vec<LlmModel>> {
        (**self).models().await
    }
}

#[async_trait]
impl<T: TaleRepository + ?Sized> TaleRepository for Arc<T> {
    async fn log_entries(
        &self,
        tale_id: &str,
        start: usize,
        count: usize,
    ) -> TaleweaverResult<Vec<LogEntry>> {
        (**self).log_entries(tale_id, start, count).await
    }

    async fn save(&self, tale: &Tale) -> TaleweaverResult<()> {
        (**self).save(tale).await
    }

    async fn load(&self, tale_id: &str) -> TaleweaverResult<Tale> {
        (**self).load(tale_id).await
    }
}
