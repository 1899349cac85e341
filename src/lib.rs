#![forbid(unsafe_code)]

//! Bounding-box driven retrieval of ECMWF climate reanalysis data.
//!
//! You describe a region of interest either as four literal bounds or as a
//! vector geometry file (shapefile or GeoJSON); the resolved [`BoundingBox`]
//! is rendered into the `area` keyword convention of one of three backends
//! (generic CDS, dataset-specific CDS, legacy MARS) and combined with a
//! request template loaded from YAML or JSON. The blocking clients then
//! submit, poll, and download.
//!
//! **Quick start**
//! ```no_run
//! use std::path::Path;
//! use era5_bbox::{Backend, BoundingBox, CdsClient, Request};
//!
//! let bbox = BoundingBox::from_literal("5,55,55,135")?;
//! let request = Request::from_file(Path::new("cds_parameters.json"))?
//!     .with_area(&bbox, Backend::Cds);
//!
//! let client = CdsClient::from_home_rc()?;
//! let result = client.retrieve(
//!     "reanalysis-era5-land-monthly-means",
//!     &request,
//!     Path::new("era5-request.nc"),
//! )?;
//! println!("{} bytes", result.size_bytes);
//! # Ok::<(), era5_bbox::Error>(())
//! ```
//!
//! Notes:
//! - Credentials come from `~/.cdsapirc` / `~/.ecmwfapirc`; the library never
//!   reads them outside [`ClientConfig`].
//! - Literal boundaries are positional (`lat_min,lat_max,lon_min,lon_max`)
//!   and deliberately not range-checked; geometry extents are min/max
//!   reconciled. See [`BoundingBox`].

mod bbox;
mod client;
mod config;
mod dates;
mod error;
mod geometry;
mod request;

pub use crate::bbox::{resolve, Backend, BoundingBox};
pub use crate::client::{CdsClient, MarsClient, RetrieveResult};
pub use crate::config::{ClientConfig, CDS_RC, ECMWF_RC};
pub use crate::dates::{monthly_date_sequence, today_stamp};
pub use crate::error::{Error, Result};
pub use crate::geometry::{read_extent, GeometryExtent};
pub use crate::request::{Request, RequestValue};
