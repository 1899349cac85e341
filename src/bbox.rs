use std::path::Path;

use crate::error::{Error, Result};
use crate::geometry::{self, GeometryExtent};
use crate::request::RequestValue;

/// Retrieval backend, each with its own `area` encoding convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Generic CDS retrieval (ERA5-complete style), slash-delimited area string.
    Era5,
    /// Dataset-specific CDS retrieval, four-element area list.
    Cds,
    /// Legacy MARS web API, slash-delimited area string.
    Mars,
}

/// Axis-aligned geographic bounding box in degrees.
///
/// Built once per invocation, either from literal CLI boundaries or from a
/// geometry file extent, and consumed exactly once when the `area` keyword of
/// a request is populated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl BoundingBox {
    /// Parse literal boundaries in the form `lat_min,lat_max,lon_min,lon_max`.
    ///
    /// The four values are taken positionally: the caller's ordering is
    /// trusted as-is, with no min/max reconciliation. Coordinates are also not
    /// range-checked, so values outside [-90, 90]/[-180, 180] pass through
    /// unchanged.
    pub fn from_literal(text: &str) -> Result<Self> {
        let tokens: Vec<&str> = text.split(',').map(str::trim).collect();
        if tokens.len() != 4 {
            return Err(Error::MalformedInput(format!(
                "expected 4 comma-separated values (lat_min,lat_max,lon_min,lon_max), got {}",
                tokens.len()
            )));
        }

        let mut bounds = [0f64; 4];
        for (slot, token) in bounds.iter_mut().zip(&tokens) {
            *slot = token
                .parse()
                .map_err(|_| Error::MalformedInput(format!("not a number: {token}")))?;
        }

        Ok(Self {
            lat_min: bounds[0],
            lat_max: bounds[1],
            lon_min: bounds[2],
            lon_max: bounds[3],
        })
    }

    /// Build a box from a geometry extent.
    ///
    /// Unlike [`BoundingBox::from_literal`], extent readers are not trusted to
    /// order min/max, so each axis is reconciled here.
    pub fn from_extent(extent: &GeometryExtent) -> Self {
        Self {
            lat_min: extent.miny.min(extent.maxy),
            lat_max: extent.miny.max(extent.maxy),
            lon_min: extent.minx.min(extent.maxx),
            lon_max: extent.minx.max(extent.maxx),
        }
    }

    /// Render the box the way `backend` expects the `area` keyword.
    ///
    /// Pure and stateless; values are stringified with the default float
    /// representation, no rounding applied.
    pub fn area_for(&self, backend: Backend) -> RequestValue {
        match backend {
            Backend::Era5 | Backend::Mars => RequestValue::Str(format!(
                "{}/{}/{}/{}",
                self.lat_min, self.lon_min, self.lat_max, self.lon_max
            )),
            Backend::Cds => RequestValue::FloatList(vec![
                self.lat_max,
                self.lon_min,
                self.lat_min,
                self.lon_max,
            ]),
        }
    }
}

/// Resolve the region of interest from the two possible CLI inputs.
///
/// A geometry file wins over literal boundaries when both are given; with
/// neither, resolution fails with [`Error::MissingBoundaryInput`].
pub fn resolve(boundaries: Option<&str>, geometry_file: Option<&Path>) -> Result<BoundingBox> {
    if let Some(path) = geometry_file {
        let extent = geometry::read_extent(path)?;
        return Ok(BoundingBox::from_extent(&extent));
    }

    match boundaries {
        Some(text) => BoundingBox::from_literal(text),
        None => Err(Error::MissingBoundaryInput),
    }
}
