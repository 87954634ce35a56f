//! Domain model structs and DTOs.
//!
//! Each submodule contains the row structs (`FromRow`) for its tables and
//! the create/update DTOs its repository accepts.

pub mod assessment;
pub mod attendance;
pub mod conversation;
pub mod event;
pub mod fee;
pub mod school;
pub mod section;
pub mod student;
pub mod user;
