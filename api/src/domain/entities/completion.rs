//! Chapter completion record

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::chapter::ChapterId;
use super::subject::SubjectId;
use super::user::UserId;

/// A user finished reading a chapter. Unique per (user, chapter).
#[derive(Debug, Clone, Serialize)]
pub struct ChapterCompletion {
    pub user_id: UserId,
    pub chapter_id: ChapterId,
    pub subject_id: SubjectId,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewChapterCompletion {
    pub user_id: UserId,
    pub chapter_id: ChapterId,
    pub subject_id: SubjectId,
}
