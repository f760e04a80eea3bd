//! In-memory catalog, loadable from TOML

use crate::catalog::QuestionCatalog;
use crate::error::QuizError;
use crate::question::Question;
use crate::types::{QuestionId, Subject, SubjectId, Topic, TopicId};
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::RwLock;
use tracing::info;

/// On-disk catalog layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

#[derive(Debug, Default)]
struct CatalogData {
    subjects: BTreeMap<SubjectId, Subject>,
    topics: BTreeMap<TopicId, Topic>,
    /// Keyed by id so pools come out in ascending id order
    questions: BTreeMap<QuestionId, Question>,
}

/// In-memory catalog implementation
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    data: RwLock<CatalogData>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from its file representation, validating references
    pub fn from_catalog_file(file: CatalogFile) -> crate::error::Result<Self> {
        let catalog = Self::new();
        for subject in file.subjects {
            catalog.add_subject(subject)?;
        }
        for topic in file.topics {
            catalog.add_topic(topic)?;
        }
        for question in file.questions {
            catalog.add_question(question)?;
        }
        Ok(catalog)
    }

    /// Parse a TOML catalog
    pub fn from_toml(contents: &str) -> crate::error::Result<Self> {
        let file: CatalogFile = toml::from_str(contents).context("Invalid catalog TOML")?;
        Self::from_catalog_file(file)
    }

    /// Load a TOML catalog from disk
    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        let catalog = Self::from_toml(&contents)?;

        info!(
            path = %path.display(),
            questions = catalog.question_count()?,
            "Loaded question catalog"
        );
        Ok(catalog)
    }

    pub fn add_subject(&self, subject: Subject) -> crate::error::Result<()> {
        let mut data = self.write_data()?;
        data.subjects.insert(subject.id, subject);
        Ok(())
    }

    pub fn add_topic(&self, topic: Topic) -> crate::error::Result<()> {
        let mut data = self.write_data()?;
        if !data.subjects.contains_key(&topic.subject_id) {
            return Err(QuizError::SubjectNotFound {
                subject_id: topic.subject_id,
            }
            .into());
        }
        data.topics.insert(topic.id, topic);
        Ok(())
    }

    pub fn add_question(&self, question: Question) -> crate::error::Result<()> {
        question.validate()?;

        let mut data = self.write_data()?;
        if !data.topics.contains_key(&question.topic_id()) {
            return Err(QuizError::TopicNotFound {
                topic_id: question.topic_id(),
            }
            .into());
        }
        data.questions.insert(question.id(), question);
        Ok(())
    }

    pub fn question_count(&self) -> crate::error::Result<usize> {
        Ok(self.read_data()?.questions.len())
    }

    pub fn subjects(&self) -> crate::error::Result<Vec<Subject>> {
        Ok(self.read_data()?.subjects.values().cloned().collect())
    }

    fn read_data(&self) -> crate::error::Result<std::sync::RwLockReadGuard<'_, CatalogData>> {
        self.data.read().map_err(|_| {
            QuizError::InternalError {
                message: "Failed to acquire catalog read lock".to_string(),
            }
            .into()
        })
    }

    fn write_data(&self) -> crate::error::Result<std::sync::RwLockWriteGuard<'_, CatalogData>> {
        self.data.write().map_err(|_| {
            QuizError::InternalError {
                message: "Failed to acquire catalog write lock".to_string(),
            }
            .into()
        })
    }
}

#[async_trait]
impl QuestionCatalog for InMemoryCatalog {
    async fn question(&self, question_id: QuestionId) -> crate::error::Result<Option<Question>> {
        Ok(self.read_data()?.questions.get(&question_id).cloned())
    }

    async fn questions_in_topics(
        &self,
        topics: &HashSet<TopicId>,
    ) -> crate::error::Result<Vec<Question>> {
        Ok(self
            .read_data()?
            .questions
            .values()
            .filter(|question| topics.contains(&question.topic_id()))
            .cloned()
            .collect())
    }

    async fn topic(&self, topic_id: TopicId) -> crate::error::Result<Option<Topic>> {
        Ok(self.read_data()?.topics.get(&topic_id).cloned())
    }

    async fn topics_in_subject(&self, subject_id: SubjectId) -> crate::error::Result<Vec<Topic>> {
        Ok(self
            .read_data()?
            .topics
            .values()
            .filter(|topic| topic.subject_id == subject_id)
            .cloned()
            .collect())
    }
}
