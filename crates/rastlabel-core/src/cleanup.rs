//! Temporary map bookkeeping.
//!
//! [`TempRegistry`] hands out unique map names and removes every map it
//! named when dropped, newest first. Dropping happens on every exit path of
//! the owning scope, so a failed run leaves no temporary maps behind.

use log::{debug, warn};
use uuid::Uuid;

use crate::toolkit::{Invocation, Toolkit};

/// Prefix of generated output map names.
pub const TEMP_PREFIX: &str = "v_what_rastlabel";

/// Generates a map name unique to this run: `prefix` followed by a UUID
/// with `-` replaced by `_`.
#[must_use]
pub fn temp_name(prefix: &str) -> String {
    format!("{prefix}{}", Uuid::new_v4()).replace('-', "_")
}

/// Scoped owner of temporary map names.
pub struct TempRegistry<'a, T: Toolkit> {
    toolkit: &'a T,
    names: Vec<String>,
}

impl<'a, T: Toolkit> TempRegistry<'a, T> {
    pub fn new(toolkit: &'a T) -> Self {
        Self {
            toolkit,
            names: Vec::new(),
        }
    }

    /// Generates and registers a new temporary name.
    pub fn generate(&mut self, prefix: &str) -> String {
        let name = temp_name(prefix);
        self.names.push(name.clone());
        name
    }

    /// Removes all registered maps, newest first.
    ///
    /// A failed removal is logged and does not stop the remaining ones.
    /// Draining leaves the registry empty, so calling it again is a no-op.
    pub fn remove_all(&mut self) {
        while let Some(name) = self.names.pop() {
            debug!("Removing temporary map {name}");
            let removal = Invocation::new("g.remove")
                .flags("f")
                .param("type", "all")
                .param("name", &name)
                .quiet();
            if let Err(e) = self.toolkit.run(&removal) {
                warn!("Failed to remove temporary map {name}: {e}");
            }
        }
    }
}

impl<T: Toolkit> Drop for TempRegistry<'_, T> {
    fn drop(&mut self) {
        self.remove_all();
    }
}
