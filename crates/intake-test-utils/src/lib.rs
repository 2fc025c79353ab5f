//! Testing utilities for the case intake workspace
//!
//! In-memory implementations of every collaborator trait plus fixtures.

#![allow(missing_docs)]

mod fakes;
mod fixtures;

pub use fakes::{InMemoryRepository, MemoryObjectStore, RecordingMailer, ScriptedTextGenerator};
pub use fixtures::{
    firm, letterhead, minimal_case, mva_good_case, test_collaborators, test_collaborators_with,
    TestCollaborators,
};
