//! Workflow layer
//!
//! Orchestration of multi-step mutations over the entity store and image
//! store. Each workflow operation runs synchronously within one inbound
//! request; multi-statement sequences are wrapped in a single database
//! transaction, and storage side effects are compensated on failure.
//!
//! Workflows never talk HTTP - translating failures into status codes is
//! the API layer's job.

pub mod chapter;
pub mod follow;
pub mod manga;
pub mod user;

pub use chapter::{ChapterWithImages, ChapterWorkflow, CreateChapter, UpdateChapter};
pub use follow::{FollowWorkflow, ToggleOutcome};
pub use manga::{CreateManga, MangaWithRelations, MangaWorkflow, UpdateManga};
pub use user::{RegisterUser, UpdateProfile, UserWorkflow};
