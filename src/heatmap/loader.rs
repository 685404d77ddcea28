//! CSV resource to GridDataset conversion
//!
//! The resource is read once (the only asynchronous step of a chart's life),
//! parsed with Polars, projected onto the three columns the heatmap needs and
//! handed to `GridDataset::from_cells` for validation and seam normalization.
//!
//! Column resolution:
//! - decade: `decade`
//! - longitude: `lon` or `longitude`
//! - value: the configured column, else the first of `VALUE_COLUMN_ALIASES`

use super::data::{Cell, GridDataset};
use super::error::{HeatmapError, Result};
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;

pub const DECADE_COLUMN_ALIASES: &[&str] = &["decade"];
pub const LONGITUDE_COLUMN_ALIASES: &[&str] = &["lon", "longitude"];
pub const VALUE_COLUMN_ALIASES: &[&str] = &[
    "tas_anom_c_mean",
    "anom_c",
    "anomaly_c",
    "anom",
    "value",
    "val",
];

/// Read and parse a CSV resource
///
/// No timeout and no retry: a failure here is terminal for the chart.
pub async fn load_grid(path: impl AsRef<Path>, value_column: Option<&str>) -> Result<GridDataset> {
    let path = path.as_ref();
    log::info!("Loading grid from {}", path.display());
    let bytes = tokio::fs::read(path).await?;
    parse_grid_csv(bytes, value_column)
}

/// Parse CSV bytes into a normalized GridDataset
pub fn parse_grid_csv(bytes: Vec<u8>, value_column: Option<&str>) -> Result<GridDataset> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(HeatmapError::EmptyResource(
            "the resource is empty".to_string(),
        ));
    }

    // Every column is read as text so bad cells anywhere become nulls in the casts below
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()?;

    log::debug!(
        "CSV: parsed {} rows, columns: {:?}",
        df.height(),
        df.get_column_names()
    );

    if df.height() == 0 {
        return Err(HeatmapError::EmptyResource(
            "the resource has a header but no rows".to_string(),
        ));
    }

    let decade_name = resolve_column(&df, "decade", DECADE_COLUMN_ALIASES)?;
    let longitude_name = resolve_column(&df, "longitude", LONGITUDE_COLUMN_ALIASES)?;
    let value_name = match value_column {
        Some(name) => resolve_column(&df, "value", &[name])?,
        None => resolve_column(&df, "value", VALUE_COLUMN_ALIASES)?,
    };

    let cells = dataframe_to_cells(df, &decade_name, &longitude_name, &value_name)?;
    GridDataset::from_cells(cells)
}

/// Find the first alias present in the frame
fn resolve_column(df: &DataFrame, role: &str, aliases: &[&str]) -> Result<String> {
    let names = df.get_column_names();
    aliases
        .iter()
        .find(|alias| names.iter().any(|n| n.as_str() == **alias))
        .map(|alias| alias.to_string())
        .ok_or_else(|| HeatmapError::MissingColumn {
            name: role.to_string(),
            candidates: aliases.join(", "),
        })
}

/// Project and cast the three heatmap columns, skipping unusable rows
fn dataframe_to_cells(
    df: DataFrame,
    decade_name: &str,
    longitude_name: &str,
    value_name: &str,
) -> Result<Vec<Cell>> {
    // Non-strict casts turn unparsable entries into nulls
    let projected = df
        .lazy()
        .select([
            col(decade_name).cast(DataType::Int64).alias("decade"),
            col(longitude_name).cast(DataType::Int64).alias("longitude"),
            col(value_name).cast(DataType::Float64).alias("value"),
        ])
        .collect()?;

    let decades = projected.column("decade")?.as_materialized_series().i64()?;
    let longitudes = projected.column("longitude")?.as_materialized_series().i64()?;
    let values = projected.column("value")?.as_materialized_series().f64()?;

    let mut cells = Vec::with_capacity(projected.height());
    let mut skipped = 0usize;

    for ((decade, longitude), value) in decades
        .into_iter()
        .zip(longitudes.into_iter())
        .zip(values.into_iter())
    {
        match (decade, longitude, value) {
            (Some(d), Some(l), Some(v)) if v.is_finite() => {
                match (i32::try_from(d), i32::try_from(l)) {
                    (Ok(d), Ok(l)) => cells.push(Cell::new(d, l, v)),
                    _ => skipped += 1,
                }
            }
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        log::warn!(
            "CSV: skipped {} row(s) with missing or non-numeric decade/longitude/value",
            skipped
        );
    }

    if cells.is_empty() {
        return Err(HeatmapError::EmptyResource(format!(
            "none of the {} row(s) had usable values",
            projected.height()
        )));
    }

    Ok(cells)
}
