//! Sampling of unlabeled rasters onto the new layer.
//!
//! Each raster gets one value column, typed from its storage type and
//! declared before `v.what.rast` fills it.

use log::info;

use crate::error::Result;
use crate::names::RasterName;
use crate::schema::{Column, raster_data_type};
use crate::toolkit::{Invocation, Toolkit};

/// Adds and fills one value column per raster on `map`, in list order.
///
/// Returns the added columns.
///
/// # Errors
///
/// Fails on the first module failure; columns added before it remain.
pub fn sample_unlabeled<T: Toolkit>(
    toolkit: &T,
    map: &str,
    rasters: &[RasterName],
) -> Result<Vec<Column>> {
    let mut added = Vec::with_capacity(rasters.len());
    for raster in rasters {
        let column = Column::new(
            &raster.column,
            raster_data_type(toolkit, raster)?.value_column_type(),
        );
        info!("Adding column {column} to {map}");
        toolkit.run(
            &Invocation::new("v.db.addcolumn")
                .param("map", map)
                .param("columns", column.to_string())
                .quiet(),
        )?;
        toolkit.run(
            &Invocation::new("v.what.rast")
                .param("map", map)
                .param("raster", &raster.qualified)
                .param("column", &raster.column)
                .quiet(),
        )?;
        added.push(column);
    }
    Ok(added)
}
