//! Test-only exports for integration tests.
//!
//! `ScriptedProvider` records every call and can be switched to fail per operation,
//! so router tests run without any network access.

mod scripted_provider;

pub use scripted_provider::{RecordedTranscription, SCRIPTED_AUDIO, SCRIPTED_TRANSCRIPT, ScriptedProvider};
