//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod approval_repo;
pub mod assessment_repo;
pub mod attendance_repo;
pub mod conversation_repo;
pub mod event_repo;
pub mod fee_repo;
pub mod parent_repo;
pub mod school_repo;
pub mod section_repo;
pub mod student_repo;
pub mod user_repo;

pub use approval_repo::ApprovalRepo;
pub use assessment_repo::AssessmentRepo;
pub use attendance_repo::AttendanceRepo;
pub use conversation_repo::ConversationRepo;
pub use event_repo::EventRepo;
pub use fee_repo::FeeRepo;
pub use parent_repo::ParentRepo;
pub use school_repo::SchoolRepo;
pub use section_repo::SectionRepo;
pub use student_repo::StudentRepo;
pub use user_repo::UserRepo;
