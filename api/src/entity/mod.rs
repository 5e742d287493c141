//! SeaORM entities
//!
//! Table models mirroring `migrations/0001_init.sql`.
//! Domain code never touches these directly; adapters convert them.

pub mod attempts;
pub mod chapter_completions;
pub mod chapters;
pub mod final_exams;
pub mod quizzes;
pub mod subjects;
pub mod users;
pub mod xp_events;
