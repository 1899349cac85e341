use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client as HttpClient;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use url::Url;

use crate::config::{ClientConfig, CDS_RC, ECMWF_RC};
use crate::error::{Error, Result};
use crate::request::Request;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
const DEFAULT_MAX_POLLS: usize = 500;

/// Outcome of a completed retrieval.
#[derive(Debug, Clone)]
pub struct RetrieveResult {
    pub target: PathBuf,
    pub size_bytes: u64,
}

fn build_http(config: &ClientConfig) -> Result<HttpClient> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static("era5-bbox/0.1"));

    let mut builder = HttpClient::builder().default_headers(headers);
    if !config.verify_tls() {
        builder = builder.danger_accept_invalid_certs(true);
    }
    Ok(builder.build()?)
}

/// Join a service path onto the configured endpoint.
///
/// `Url::join` would drop the version segment of endpoints like
/// `https://cds.climate.copernicus.eu/api/v2`, so paths are appended by hand.
fn join_url(base: &str, path: &str) -> Result<Url> {
    Ok(Url::parse(&format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    ))?)
}

fn download(http: &HttpClient, url: &str, target: &Path) -> Result<RetrieveResult> {
    log::info!("downloading {url} to {}", target.display());
    let mut resp = http.get(url).send()?.error_for_status()?;
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(target)?;
    let size_bytes = resp.copy_to(&mut file)?;
    Ok(RetrieveResult {
        target: target.to_path_buf(),
        size_bytes,
    })
}

/// Blocking client for the Climate Data Store API.
///
/// One retrieval is submit, poll until the queued task settles, download.
/// Transport and authentication failures surface immediately; there is no
/// retry beyond the status poll.
#[derive(Debug, Clone)]
pub struct CdsClient {
    config: ClientConfig,
    http: HttpClient,
    poll_interval: Duration,
    max_polls: usize,
}

impl CdsClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = build_http(&config)?;
        Ok(Self {
            config,
            http,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_polls: DEFAULT_MAX_POLLS,
        })
    }

    /// Construct from `~/.cdsapirc`.
    pub fn from_home_rc() -> Result<Self> {
        Self::new(ClientConfig::from_home_rc(CDS_RC)?)
    }

    pub fn retrieve(&self, dataset: &str, request: &Request, target: &Path) -> Result<RetrieveResult> {
        let endpoint = join_url(&self.config.url, &format!("resources/{dataset}"))?;
        let (user, password) = self.config.basic_auth_parts();

        log::info!("submitting {dataset} request");
        let mut reply: Value = self
            .http
            .post(endpoint)
            .basic_auth(&user, password.as_deref())
            .json(request)
            .send()?
            .error_for_status()?
            .json()?;

        let mut polls = 0;
        loop {
            match reply.get("state").and_then(Value::as_str).unwrap_or("queued") {
                "completed" => break,
                "failed" => {
                    let message = reply
                        .pointer("/error/message")
                        .and_then(Value::as_str)
                        .unwrap_or("no error message in reply");
                    return Err(Error::Retrieval(format!("{dataset}: {message}")));
                }
                state => {
                    let request_id = reply
                        .get("request_id")
                        .and_then(Value::as_str)
                        .ok_or_else(|| {
                            Error::Retrieval(format!("{dataset}: reply carries no request_id"))
                        })?;
                    if polls >= self.max_polls {
                        return Err(Error::Retrieval(format!(
                            "gave up waiting for task {request_id}"
                        )));
                    }
                    polls += 1;
                    log::debug!("task {request_id} is {state}");
                    thread::sleep(self.poll_interval);

                    let task_url = join_url(&self.config.url, &format!("tasks/{request_id}"))?;
                    reply = self
                        .http
                        .get(task_url)
                        .basic_auth(&user, password.as_deref())
                        .send()?
                        .error_for_status()?
                        .json()?;
                }
            }
        }

        let location = reply
            .get("location")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Retrieval(format!("{dataset}: completed reply carries no location")))?;
        let location = if location.starts_with("http://") || location.starts_with("https://") {
            location.to_string()
        } else {
            join_url(&self.config.url, location)?.to_string()
        };

        download(&self.http, &location, target)
    }
}

/// Blocking client for the legacy MARS web API.
///
/// The retrieval target lives inside the request (`target` keyword), the way
/// the MARS interface expects it.
#[derive(Debug, Clone)]
pub struct MarsClient {
    config: ClientConfig,
    http: HttpClient,
    poll_interval: Duration,
    max_polls: usize,
}

impl MarsClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = build_http(&config)?;
        Ok(Self {
            config,
            http,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_polls: DEFAULT_MAX_POLLS,
        })
    }

    /// Construct from `~/.ecmwfapirc`.
    pub fn from_home_rc() -> Result<Self> {
        Self::new(ClientConfig::from_home_rc(ECMWF_RC)?)
    }

    pub fn retrieve(&self, request: &Request) -> Result<RetrieveResult> {
        let target = request
            .get("target")
            .and_then(|v| v.as_scalar_str())
            .ok_or_else(|| Error::Retrieval("mars request carries no target".to_string()))?;
        let target = PathBuf::from(target);

        let endpoint = join_url(&self.config.url, "services/mars/requests")?;

        log::info!("submitting mars request");
        let mut submit = self.http.post(endpoint).header("X-ECMWF-KEY", &self.config.key);
        if let Some(email) = &self.config.email {
            submit = submit.header("From", email);
        }
        let mut reply: Value = submit.json(request).send()?.error_for_status()?.json()?;

        let mut polls = 0;
        loop {
            match reply.get("status").and_then(Value::as_str).unwrap_or("queued") {
                "complete" => break,
                "aborted" | "rejected" => {
                    let reason = reply
                        .get("reason")
                        .and_then(Value::as_str)
                        .unwrap_or("no reason in reply");
                    return Err(Error::Retrieval(format!("mars request: {reason}")));
                }
                status => {
                    let href = reply
                        .get("href")
                        .and_then(Value::as_str)
                        .ok_or_else(|| Error::Retrieval("mars reply carries no href".to_string()))?
                        .to_string();
                    if polls >= self.max_polls {
                        return Err(Error::Retrieval(format!("gave up waiting for {href}")));
                    }
                    polls += 1;
                    log::debug!("mars request is {status}");
                    thread::sleep(self.poll_interval);

                    reply = self
                        .http
                        .get(href.as_str())
                        .header("X-ECMWF-KEY", &self.config.key)
                        .send()?
                        .error_for_status()?
                        .json()?;
                }
            }
        }

        let result = reply
            .get("result")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Retrieval("complete mars reply carries no result".to_string()))?;
        let result = if result.starts_with("http://") || result.starts_with("https://") {
            result.to_string()
        } else {
            join_url(&self.config.url, result)?.to_string()
        };

        download(&self.http, &result, &target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_keeps_the_version_segment() {
        let u = join_url("https://cds.climate.copernicus.eu/api/v2", "resources/era5").unwrap();
        assert_eq!(
            u.as_str(),
            "https://cds.climate.copernicus.eu/api/v2/resources/era5"
        );
    }

    #[test]
    fn join_url_tolerates_slashes() {
        let u = join_url("https://api.ecmwf.int/v1/", "/services/mars/requests").unwrap();
        assert_eq!(u.as_str(), "https://api.ecmwf.int/v1/services/mars/requests");
    }

    #[test]
    fn mars_retrieve_requires_a_target() {
        let config = ClientConfig::new("https://api.ecmwf.int/v1", "abc");
        let client = MarsClient::new(config).unwrap();
        let err = client.retrieve(&Request::new()).unwrap_err();
        assert!(matches!(err, Error::Retrieval(_)));
    }
}
