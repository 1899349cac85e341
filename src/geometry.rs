use std::path::Path;

use geo::BoundingRect;

use crate::error::{Error, Result};

/// Aggregate planar extent of all features in a geometry file.
///
/// `minx`/`maxx` run along longitude, `miny`/`maxy` along latitude. No
/// ordering is guaranteed between the min and max fields; callers reconcile
/// via [`crate::BoundingBox::from_extent`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryExtent {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

/// Read the aggregate extent of a vector geometry file.
///
/// Supported formats are ESRI shapefiles (`.shp`, the `.dbf` sidecar is not
/// required) and GeoJSON (`.json`/`.geojson`).
pub fn read_extent(path: &Path) -> Result<GeometryExtent> {
    if !path.exists() {
        return Err(Error::GeometryFileNotFound(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("shp") => shapefile_extent(path),
        Some("json") | Some("geojson") => geojson_extent(path),
        _ => Err(unreadable(path, "unsupported geometry format".to_string())),
    }
}

fn shapefile_extent(path: &Path) -> Result<GeometryExtent> {
    let reader =
        shapefile::ShapeReader::from_path(path).map_err(|e| unreadable(path, e.to_string()))?;

    // The file header carries the extent over all records.
    let header = reader.header();
    let extent = GeometryExtent {
        minx: header.bbox.min.x,
        miny: header.bbox.min.y,
        maxx: header.bbox.max.x,
        maxy: header.bbox.max.y,
    };

    let shapes = reader.read().map_err(|e| unreadable(path, e.to_string()))?;
    if shapes.is_empty() {
        return Err(unreadable(path, "no features".to_string()));
    }

    Ok(extent)
}

fn geojson_extent(path: &Path) -> Result<GeometryExtent> {
    let text = std::fs::read_to_string(path)?;
    let gj: geojson::GeoJson = text
        .parse()
        .map_err(|e: geojson::Error| unreadable(path, e.to_string()))?;

    let collection: geo_types::GeometryCollection<f64> =
        geojson::quick_collection(&gj).map_err(|e| unreadable(path, e.to_string()))?;
    if collection.0.is_empty() {
        return Err(unreadable(path, "no features".to_string()));
    }

    let rect = collection
        .bounding_rect()
        .ok_or_else(|| unreadable(path, "no spatial extent".to_string()))?;

    Ok(GeometryExtent {
        minx: rect.min().x,
        miny: rect.min().y,
        maxx: rect.max().x,
        maxy: rect.max().y,
    })
}

fn unreadable(path: &Path, reason: String) -> Error {
    Error::UnreadableGeometry {
        path: path.to_path_buf(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_geojson(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn missing_file_is_reported_before_parsing() {
        let err = read_extent(Path::new("/no/such/region.shp")).unwrap_err();
        assert!(matches!(err, Error::GeometryFileNotFound(_)));
    }

    #[test]
    fn unsupported_extension_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_geojson(dir.path(), "region.txt", "not a geometry");
        let err = read_extent(&path).unwrap_err();
        assert!(matches!(err, Error::UnreadableGeometry { .. }));
    }

    #[test]
    fn geojson_polygon_extent() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_geojson(
            dir.path(),
            "region.geojson",
            r#"{
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "properties": {},
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[
                            [100.0, 10.0], [120.0, 10.0],
                            [120.0, 30.0], [100.0, 30.0],
                            [100.0, 10.0]
                        ]]
                    }
                }]
            }"#,
        );

        let extent = read_extent(&path).unwrap();
        assert_eq!(extent.minx, 100.0);
        assert_eq!(extent.miny, 10.0);
        assert_eq!(extent.maxx, 120.0);
        assert_eq!(extent.maxy, 30.0);
    }

    #[test]
    fn geojson_extent_spans_all_features() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_geojson(
            dir.path(),
            "points.json",
            r#"{
                "type": "FeatureCollection",
                "features": [
                    {"type": "Feature", "properties": {},
                     "geometry": {"type": "Point", "coordinates": [5.0, -3.0]}},
                    {"type": "Feature", "properties": {},
                     "geometry": {"type": "Point", "coordinates": [-2.0, 7.5]}}
                ]
            }"#,
        );

        let extent = read_extent(&path).unwrap();
        assert_eq!(extent.minx, -2.0);
        assert_eq!(extent.miny, -3.0);
        assert_eq!(extent.maxx, 5.0);
        assert_eq!(extent.maxy, 7.5);
    }

    #[test]
    fn empty_collection_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_geojson(
            dir.path(),
            "empty.geojson",
            r#"{"type": "FeatureCollection", "features": []}"#,
        );
        let err = read_extent(&path).unwrap_err();
        assert!(matches!(err, Error::UnreadableGeometry { .. }));
    }

    #[test]
    fn garbage_geojson_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_geojson(dir.path(), "broken.geojson", "{not json");
        let err = read_extent(&path).unwrap_err();
        assert!(matches!(err, Error::UnreadableGeometry { .. }));
    }
}
