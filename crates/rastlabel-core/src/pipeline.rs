//! End-to-end sampling run.
//!
//! Steps run strictly in order, each to completion:
//!
//! 1. derive column names and check them
//! 2. build the output schema from the labeled rasters' data types
//! 3. export the input points and sample the labeled rasters
//! 4. import the samples as a new point map
//! 5. add one column per unlabeled raster
//! 6. optionally join the sampled columns onto the input map
//! 7. write provenance metadata
//!
//! Without an explicit output name the new map is temporary and is removed
//! when the run ends, whether it succeeded, failed or was interrupted.

use std::sync::atomic::{AtomicBool, Ordering};

use log::{info, warn};

use crate::cleanup::{TEMP_PREFIX, TempRegistry};
use crate::error::{RastLabelError, Result};
use crate::import::import_samples;
use crate::join::join_to_input;
use crate::metadata::write_history;
use crate::options::Options;
use crate::sampler::sample;
use crate::schema::{Column, build_schema, check_columns};
use crate::secondary::sample_unlabeled;
use crate::toolkit::Toolkit;

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Name of the sampled map.
    pub output: String,
    /// Whether `output` was temporary and has been removed.
    pub temporary: bool,
    /// Number of sampled points.
    pub points: usize,
    /// Columns of the sampled map, excluding `cat`.
    pub columns: Vec<Column>,
    /// Columns joined onto the input map.
    pub joined: Vec<String>,
}

/// Runs the whole sampling pipeline.
///
/// # Errors
///
/// Returns the first validation or module error. Temporary maps are removed
/// before returning either way; changes already made to a named output map
/// or to the input map are kept.
pub fn run<T: Toolkit>(toolkit: &T, options: &Options) -> Result<RunSummary> {
    run_interruptible(toolkit, options, &AtomicBool::new(false))
}

/// Like [`run`], but stops with [`RastLabelError::Interrupted`] once
/// `interrupted` is set.
///
/// The flag is checked after every step, so a module killed by the same
/// interrupt surfaces as an interruption rather than a module failure.
///
/// # Errors
///
/// As [`run`], plus [`RastLabelError::Interrupted`].
pub fn run_interruptible<T: Toolkit>(
    toolkit: &T,
    options: &Options,
    interrupted: &AtomicBool,
) -> Result<RunSummary> {
    options.validate()?;
    let labeled = options.labeled_rasters();
    let unlabeled = options.unlabeled_rasters();
    check_columns(&labeled, &unlabeled)?;

    let mut temps = TempRegistry::new(toolkit);
    let (output, temporary) = match options.output_name() {
        Some(name) => (name.to_string(), false),
        None => (temps.generate(TEMP_PREFIX), true),
    };

    let schema = checkpoint(interrupted, build_schema(toolkit, &labeled))?;
    let samples = checkpoint(interrupted, sample(toolkit, &options.vector, &labeled))?;
    checkpoint(
        interrupted,
        import_samples(toolkit, &output, &schema, &samples, options.overwrite),
    )?;

    let mut columns = schema.columns().to_vec();
    columns.extend(checkpoint(
        interrupted,
        sample_unlabeled(toolkit, &output, &unlabeled),
    )?);

    let joined = if options.add_columns {
        checkpoint(
            interrupted,
            join_to_input(toolkit, &options.vector, &output, options.overwrite),
        )?
    } else {
        Vec::new()
    };

    checkpoint(interrupted, write_history(toolkit, &output, options))?;
    info!("Sampled {} point(s) into {output}", samples.records());

    temps.remove_all();
    Ok(RunSummary {
        output,
        temporary,
        points: samples.records(),
        columns,
        joined,
    })
}

/// Replaces the outcome of a step with [`RastLabelError::Interrupted`] once
/// the flag is set.
fn checkpoint<R>(interrupted: &AtomicBool, result: Result<R>) -> Result<R> {
    if interrupted.load(Ordering::SeqCst) {
        if let Err(e) = &result {
            warn!("Step failed after interrupt: {e}");
        }
        return Err(RastLabelError::Interrupted);
    }
    result
}
