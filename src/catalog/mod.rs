//! Subject, topic and question catalog
//!
//! The catalog answers "which questions belong to these topics". It is an
//! external collaborator from the engine's point of view, so access goes
//! through the async [`QuestionCatalog`] trait.

pub mod memory;

use crate::question::Question;
use crate::types::{QuestionId, SubjectId, Topic, TopicId};
use async_trait::async_trait;
use std::collections::HashSet;

pub use memory::{CatalogFile, InMemoryCatalog};

/// Trait for catalog queries
#[async_trait]
pub trait QuestionCatalog: Send + Sync {
    /// Look up one question by id
    async fn question(&self, question_id: QuestionId) -> crate::error::Result<Option<Question>>;

    /// Every question whose topic is in `topics`, in a stable order
    async fn questions_in_topics(
        &self,
        topics: &HashSet<TopicId>,
    ) -> crate::error::Result<Vec<Question>>;

    /// Look up one topic by id
    async fn topic(&self, topic_id: TopicId) -> crate::error::Result<Option<Topic>>;

    /// Every topic of a subject
    async fn topics_in_subject(&self, subject_id: SubjectId) -> crate::error::Result<Vec<Topic>>;
}
