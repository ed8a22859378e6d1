//! Named operations registered on a client at runtime.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::client::SheetsClient;
use crate::errors::{Result, SheetsError};

/// Names of operations built into the client. Custom operations can't use
/// these.
pub const BUILTIN_OPERATIONS: &[&str] = &[
    "set_access_token",
    "access_token",
    "spreadsheet",
    "spreadsheet_by_title",
    "sheet",
    "sheet_by_id",
    "sheet_list",
    "spreadsheet_list",
    "get",
    "collection",
    "all",
    "first",
    "values",
    "update",
    "clear",
    "append",
    "append_with_header",
    "append_records",
    "ranges",
    "range",
    "major_dimension",
    "date_time_render_option",
    "value_render_option",
    "spreadsheet_properties",
    "sheet_properties",
    "add_sheet",
    "delete_sheet",
    "spreadsheet_id",
    "service",
    "service_mut",
    "set_service",
    "selection",
    "call",
    "macros",
    "macros_mut",
];

pub fn is_builtin(name: &str) -> bool {
    BUILTIN_OPERATIONS.contains(&name)
}

pub type MacroFn<B> = Arc<
    dyn for<'a> Fn(&'a mut SheetsClient<B>) -> BoxFuture<'a, Result<serde_json::Value>>
        + Send
        + Sync,
>;

/// Table of custom operations keyed by name.
pub struct MacroRegistry<B> {
    macros: BTreeMap<String, MacroFn<B>>,
}

impl<B> MacroRegistry<B> {
    pub fn new() -> Self {
        MacroRegistry {
            macros: BTreeMap::new(),
        }
    }

    /// Register an operation, replacing any custom operation with the same
    /// name.
    pub fn register<F>(&mut self, name: impl Into<String>, op: F) -> Result<()>
    where
        F: for<'a> Fn(&'a mut SheetsClient<B>) -> BoxFuture<'a, Result<serde_json::Value>>
            + Send
            + Sync
            + 'static,
    {
        let name = name.into();
        if is_builtin(&name) {
            return Err(SheetsError::ReservedOperation(name));
        }
        self.macros.insert(name, Arc::new(op));
        Ok(())
    }

    pub fn has_macro(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Result<MacroFn<B>> {
        self.macros
            .get(name)
            .cloned()
            .ok_or_else(|| SheetsError::UnknownOperation(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.macros.keys().map(|k| k.as_str())
    }
}

impl<B> Default for MacroRegistry<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> Clone for MacroRegistry<B> {
    fn clone(&self) -> Self {
        MacroRegistry {
            macros: self.macros.clone(),
        }
    }
}

impl<B> fmt::Debug for MacroRegistry<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.macros.keys()).finish()
    }
}
