// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions for the external collaborators of the sync core.

pub mod acquirer;
pub mod source;

pub use acquirer::CredentialAcquirer;
pub use source::ConversationSource;
