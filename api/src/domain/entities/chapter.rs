//! Chapter domain entity

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::subject::SubjectId;

entity_id!(
    /// Unique identifier for a chapter
    ChapterId
);

/// A lesson inside a subject. `content` is markdown.
#[derive(Debug, Clone, Serialize)]
pub struct Chapter {
    pub id: ChapterId,
    pub subject_id: SubjectId,
    pub title: String,
    pub content: String,
    pub order_index: i32,
    pub xp_reward: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data needed to create a new chapter
#[derive(Debug, Clone)]
pub struct NewChapter {
    pub subject_id: SubjectId,
    pub title: String,
    pub content: String,
    pub order_index: i32,
    pub xp_reward: i32,
}

/// Partial update of a chapter
#[derive(Debug, Clone, Default)]
pub struct ChapterUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub order_index: Option<i32>,
    pub xp_reward: Option<i32>,
}

impl ChapterUpdate {
    pub fn apply(&self, chapter: &mut Chapter) {
        if let Some(title) = &self.title {
            chapter.title = title.clone();
        }
        if let Some(content) = &self.content {
            chapter.content = content.clone();
        }
        if let Some(order_index) = self.order_index {
            chapter.order_index = order_index;
        }
        if let Some(xp_reward) = self.xp_reward {
            chapter.xp_reward = xp_reward;
        }
        chapter.updated_at = Utc::now();
    }
}
