//! Service layer for refactoring flows
//!
//! The flows are split into 3 focused services:
//! - EditApplier: Applies refactoring results and saves the documents they touched
//! - MoveService: Move refactorings (files, instance methods, static members, types)
//! - RefactorService: Apply-refactoring dispatch and the rename trigger

pub mod edit_service;
pub mod move_service;
pub mod refactor_service;

pub use edit_service::*;
pub use move_service::*;
pub use refactor_service::*;
