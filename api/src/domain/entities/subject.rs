//! Subject domain entity
//!
//! A subject is the top-level unit of the catalog (e.g. "Linear Algebra").
//! It groups ordered chapters and at most one final exam.

use chrono::{DateTime, Utc};
use serde::Serialize;

entity_id!(
    /// Unique identifier for a subject
    SubjectId
);

#[derive(Debug, Clone, Serialize)]
pub struct Subject {
    pub id: SubjectId,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub order_index: i32,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subject {
    /// Whether a viewer may see this subject
    pub fn visible_to(&self, is_admin: bool) -> bool {
        self.is_published || is_admin
    }
}

/// Data needed to create a new subject
#[derive(Debug, Clone)]
pub struct NewSubject {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub order_index: i32,
    pub is_published: bool,
}

/// Partial update of a subject; `None` leaves the field untouched
#[derive(Debug, Clone, Default)]
pub struct SubjectUpdate {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<Option<String>>,
    pub order_index: Option<i32>,
    pub is_published: Option<bool>,
}

impl SubjectUpdate {
    pub fn apply(&self, subject: &mut Subject) {
        if let Some(title) = &self.title {
            subject.title = title.clone();
        }
        if let Some(slug) = &self.slug {
            subject.slug = slug.clone();
        }
        if let Some(description) = &self.description {
            subject.description = description.clone();
        }
        if let Some(order_index) = self.order_index {
            subject.order_index = order_index;
        }
        if let Some(is_published) = self.is_published {
            subject.is_published = is_published;
        }
        subject.updated_at = Utc::now();
    }
}
