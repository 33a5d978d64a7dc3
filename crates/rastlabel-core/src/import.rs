//! Creation of the sampled point layer.

use log::info;

use crate::error::Result;
use crate::sampler::Samples;
use crate::schema::OutputSchema;
use crate::toolkit::{Invocation, Toolkit};

/// Imports `samples` as the new point map `output`.
///
/// Fields 1 and 2 give the point geometry; every field, coordinates
/// included, is stored in the column `schema` declares at its position.
///
/// # Errors
///
/// Fails if `v.in.ascii` fails, e.g. because `output` exists and
/// `overwrite` is not set.
pub fn import_samples<T: Toolkit>(
    toolkit: &T,
    output: &str,
    schema: &OutputSchema,
    samples: &Samples,
    overwrite: bool,
) -> Result<()> {
    info!("Creating {output} from {} sampled point(s)", samples.records());
    toolkit.run(
        &Invocation::new("v.in.ascii")
            .param("input", "-")
            .param("output", output)
            .param("columns", schema.to_string())
            .param("separator", "pipe")
            .param("format", "point")
            .param("x", "1")
            .param("y", "2")
            .stdin(samples.text())
            .overwrite(overwrite)
            .quiet(),
    )?;
    Ok(())
}
