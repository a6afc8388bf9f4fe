// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Recall conversation archive.
//!
//! This crate provides the error taxonomy, the domain types shared by the
//! storage, sync, and credential crates, and the trait definitions for the
//! two external collaborators: the remote conversation source and the
//! credential acquirer.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::RecallError;
pub use traits::{ConversationSource, CredentialAcquirer};
pub use types::{
    BotId, BotSelection, Conversation, ConversationId, ConversationKey, CredentialSet,
    LookbackWindow, Message, ProgressEvent, RemoteConversation, Role, SyncFailure, SyncScope,
    SyncSummary,
};
