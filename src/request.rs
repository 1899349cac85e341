use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bbox::{Backend, BoundingBox};
use crate::error::{Error, Result};

/// Value type for a request keyword.
///
/// Untagged so that YAML and JSON templates deserialize directly: numbers
/// become `Int`/`Float`, strings stay strings, arrays become the matching
/// list variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestValue {
    Int(i64),
    Float(f64),
    Str(String),
    IntList(Vec<i64>),
    FloatList(Vec<f64>),
    StrList(Vec<String>),
}

impl From<&str> for RequestValue {
    fn from(value: &str) -> Self {
        RequestValue::Str(value.to_string())
    }
}

impl From<String> for RequestValue {
    fn from(value: String) -> Self {
        RequestValue::Str(value)
    }
}

impl From<i64> for RequestValue {
    fn from(value: i64) -> Self {
        RequestValue::Int(value)
    }
}

impl From<i32> for RequestValue {
    fn from(value: i32) -> Self {
        RequestValue::Int(value as i64)
    }
}

impl From<f64> for RequestValue {
    fn from(value: f64) -> Self {
        RequestValue::Float(value)
    }
}

impl From<Vec<String>> for RequestValue {
    fn from(value: Vec<String>) -> Self {
        RequestValue::StrList(value)
    }
}

impl From<Vec<&str>> for RequestValue {
    fn from(value: Vec<&str>) -> Self {
        RequestValue::StrList(value.into_iter().map(|s| s.to_string()).collect())
    }
}

impl From<Vec<f64>> for RequestValue {
    fn from(value: Vec<f64>) -> Self {
        RequestValue::FloatList(value)
    }
}

impl RequestValue {
    /// The value as a plain string, if it is a scalar.
    pub fn as_scalar_str(&self) -> Option<String> {
        match self {
            RequestValue::Str(s) => Some(s.clone()),
            RequestValue::Int(i) => Some(i.to_string()),
            RequestValue::Float(f) => Some(f.to_string()),
            _ => None,
        }
    }
}

/// Dataset-retrieval parameters expressed as keyword/value pairs.
///
/// A request loaded from a template file is treated as an immutable value;
/// the `with*` combinators return a new request instead of mutating the
/// template in place, so one template can seed many per-year requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Request {
    inner: BTreeMap<String, RequestValue>,
}

impl Request {
    pub fn new() -> Self {
        Self {
            inner: BTreeMap::new(),
        }
    }

    /// Load a request template from a YAML (`.yml`/`.yaml`) or JSON (`.json`)
    /// file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Template(format!("cannot read {}: {e}", path.display())))?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("yml") | Some("yaml") => serde_yaml::from_str(&text)
                .map_err(|e| Error::Template(format!("{}: {e}", path.display()))),
            Some("json") => serde_json::from_str(&text)
                .map_err(|e| Error::Template(format!("{}: {e}", path.display()))),
            _ => Err(Error::Template(format!(
                "unsupported template format: {}",
                path.display()
            ))),
        }
    }

    /// Construct a request from an iterator of keyword/value pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<RequestValue>,
    {
        let mut r = Self::new();
        for (k, v) in pairs {
            r = r.with(k, v);
        }
        r
    }

    /// Return a new request with `key` set to `value`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<RequestValue>) -> Self {
        self.inner.insert(key.into(), value.into());
        self
    }

    /// Return a new request with the `area` keyword rendered for `backend`.
    pub fn with_area(self, bbox: &BoundingBox, backend: Backend) -> Self {
        self.with("area", bbox.area_for(backend))
    }

    pub fn get(&self, key: &str) -> Option<&RequestValue> {
        self.inner.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RequestValue)> {
        self.inner.iter()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::Backend;
    use std::io::Write;

    fn write_template(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_yaml_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_template(
            dir.path(),
            "mars_parameters.yaml",
            "class: ei\nname: era_interim\nstep: 0\ngrid: '0.75/0.75'\n",
        );

        let req = Request::from_file(&path).unwrap();
        assert_eq!(req.get("class"), Some(&RequestValue::Str("ei".to_string())));
        assert_eq!(req.get("step"), Some(&RequestValue::Int(0)));
        assert_eq!(
            req.get("grid"),
            Some(&RequestValue::Str("0.75/0.75".to_string()))
        );
    }

    #[test]
    fn loads_json_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_template(
            dir.path(),
            "cds_parameters.json",
            r#"{
                "product_type": "monthly_averaged_reanalysis",
                "variable": ["2m_temperature", "snowfall"],
                "year": ["1981"],
                "time": "00:00",
                "format": "netcdf"
            }"#,
        );

        let req = Request::from_file(&path).unwrap();
        assert_eq!(
            req.get("variable"),
            Some(&RequestValue::StrList(vec![
                "2m_temperature".to_string(),
                "snowfall".to_string()
            ]))
        );
        assert_eq!(
            req.get("format"),
            Some(&RequestValue::Str("netcdf".to_string()))
        );
    }

    #[test]
    fn rejects_unknown_template_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_template(dir.path(), "parameters.toml", "a = 1\n");
        assert!(matches!(
            Request::from_file(&path),
            Err(Error::Template(_))
        ));
    }

    #[test]
    fn with_leaves_the_template_untouched() {
        let template = Request::from_pairs([("class", "ei"), ("type", "an")]);
        let derived = template
            .clone()
            .with("date", "19790101")
            .with("target", "out.nc");

        assert_eq!(template.len(), 2);
        assert!(template.get("date").is_none());
        assert_eq!(
            derived.get("date"),
            Some(&RequestValue::Str("19790101".to_string()))
        );
    }

    #[test]
    fn with_area_renders_per_backend() {
        let bbox = BoundingBox::from_literal("10,30,100,120").unwrap();
        let req = Request::new().with_area(&bbox, Backend::Cds);
        assert_eq!(
            req.get("area"),
            Some(&RequestValue::FloatList(vec![30.0, 100.0, 10.0, 120.0]))
        );

        let req = Request::new().with_area(&bbox, Backend::Mars);
        assert_eq!(
            req.get("area"),
            Some(&RequestValue::Str("10/100/30/120".to_string()))
        );
    }

    #[test]
    fn serializes_as_flat_json_object() {
        let req = Request::from_pairs([("product_type", "reanalysis")])
            .with("area", RequestValue::FloatList(vec![55.0, 55.0, 5.0, 135.0]));
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["product_type"], "reanalysis");
        assert_eq!(json["area"][0], 55.0);
        assert_eq!(json["area"][3], 135.0);
    }
}
