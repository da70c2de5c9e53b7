// SPDX-FileCopyrightText: 2026 Livechat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Custom-field allow-list.

/// Decides which custom field ids the active channel configuration accepts.
pub trait FieldPolicy: Send + Sync {
    fn allows_field_id(&self, id: &str) -> bool;
}

impl<F> FieldPolicy for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn allows_field_id(&self, id: &str) -> bool {
        self(id)
    }
}
