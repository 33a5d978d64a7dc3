//! Provenance metadata of the output map.

use log::info;

use crate::error::Result;
use crate::options::{MODULE_NAME, Options};
use crate::toolkit::{Invocation, Toolkit};

/// Comment stored in the header of the output map.
#[must_use]
pub fn comment() -> String {
    format!("created with {MODULE_NAME}")
}

/// Replaces the command history of `map` with the run described by `options`.
///
/// # Errors
///
/// Fails if `v.support` fails.
pub fn write_history<T: Toolkit>(toolkit: &T, map: &str, options: &Options) -> Result<()> {
    info!("Writing metadata of {map}");
    toolkit.run(
        &Invocation::new("v.support")
            .flags("r")
            .param("map", map)
            .param("comment", comment())
            .param("cmdhist", options.history())
            .quiet(),
    )?;
    Ok(())
}
