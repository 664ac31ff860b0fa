//! External collaborators behind traits: the remote transform API, the
//! description generator and the local effect pipeline. Mock implementations
//! allow wiring the session and tests without network or credentials.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;

use crate::config::ApiCredentials;
use crate::error::RestyleError;

const DEFAULT_API_BASE: &str = "https://api.deepai.org";
const RESTYLE_ENDPOINT: &str = "api/image-editor";
const ENHANCE_ENDPOINT: &str = "api/torch-srgan";
const CALL_TIMEOUT: Duration = Duration::from_secs(120);

/// Produces descriptive text for an image. Long-latency, no retry contract.
pub trait DescriptionAdapter: Send + Sync {
    fn describe(&self, image_path: &Path) -> Result<String, RestyleError>;
}

/// The remote image-editing API: a restyle call, a clarity-enhancement call
/// and the download of either call's result.
pub trait TransformAdapter: Send + Sync {
    /// Sends the image plus prompt text; returns the URL of the result image.
    fn restyle(&self, image_path: &Path, prompt: &str) -> Result<String, RestyleError>;
    /// Sends a previously downloaded result; returns the URL of the enhanced image.
    fn enhance(&self, image_path: &Path) -> Result<String, RestyleError>;
    /// Fetches a result URL into `dest`.
    fn download(&self, url: &str, dest: &Path) -> Result<(), RestyleError>;
}

/// Local filter pipeline consuming an image path plus an auxiliary text file
/// and producing a derived image path.
pub trait EffectAdapter: Send + Sync {
    fn apply(&self, image_path: &Path, prompt_path: &Path) -> Result<PathBuf, RestyleError>;
}

/// A placeholder description source that echoes fixed text, for wiring the
/// session without the browser-automation scraper.
pub struct MockDescriptionAdapter {
    pub text: String,
}

impl MockDescriptionAdapter {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl DescriptionAdapter for MockDescriptionAdapter {
    fn describe(&self, image_path: &Path) -> Result<String, RestyleError> {
        if !image_path.exists() {
            return Err(RestyleError::Service(format!(
                "image not found: {}",
                image_path.display()
            )));
        }
        Ok(self.text.clone())
    }
}

/// Offline transform adapter: fabricates result URLs and writes the URL back
/// as the downloaded bytes, so the pipeline can run end to end in tests.
#[derive(Default)]
pub struct MockTransformAdapter;

impl TransformAdapter for MockTransformAdapter {
    fn restyle(&self, image_path: &Path, _prompt: &str) -> Result<String, RestyleError> {
        if !image_path.exists() {
            return Err(RestyleError::Service(format!(
                "image not found: {}",
                image_path.display()
            )));
        }
        Ok("mock://restyled".into())
    }

    fn enhance(&self, image_path: &Path) -> Result<String, RestyleError> {
        if !image_path.exists() {
            return Err(RestyleError::Service(format!(
                "image not found: {}",
                image_path.display()
            )));
        }
        Ok("mock://enhanced".into())
    }

    fn download(&self, url: &str, dest: &Path) -> Result<(), RestyleError> {
        fs::write(dest, url.as_bytes())?;
        Ok(())
    }
}

/// Blocking HTTP client against the DeepAI-style image editing API.
///
/// Both operations post multipart bodies and expect a JSON response carrying
/// an `output_url` field. The base URL is injectable for tests.
pub struct HttpTransformAdapter {
    base_url: String,
    credentials: ApiCredentials,
    client: Client,
}

impl HttpTransformAdapter {
    pub fn new(credentials: ApiCredentials) -> Self {
        Self::with_base_url(DEFAULT_API_BASE, credentials)
    }

    pub fn with_base_url(base_url: impl Into<String>, credentials: ApiCredentials) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(CALL_TIMEOUT)
            .build()
            .expect("build client");
        Self {
            base_url,
            credentials,
            client,
        }
    }

    fn api_key(&self) -> Result<&str, RestyleError> {
        self.credentials
            .api_key
            .as_deref()
            .ok_or_else(|| RestyleError::Service("API key is not configured".into()))
    }

    fn post_image(
        &self,
        endpoint: &str,
        image_path: &Path,
        prompt: Option<&str>,
    ) -> Result<String, RestyleError> {
        let key = self.api_key()?;
        let url = format!("{}/{}", self.base_url, endpoint);
        let mut form = Form::new().file("image", image_path)?;
        if let Some(prompt) = prompt {
            form = form.part(
                "text",
                Part::text(prompt.to_string()).file_name("description.txt"),
            );
        }
        let response = self
            .client
            .post(&url)
            .header("api-key", key)
            .multipart(form)
            .send()?;
        if !response.status().is_success() {
            return Err(RestyleError::UnexpectedStatus(response.status()));
        }
        let body: serde_json::Value = response.json()?;
        let output = body
            .get("output_url")
            .and_then(|value| value.as_str())
            .map(|value| value.to_string())
            .ok_or_else(|| RestyleError::Service("response is missing output_url".into()))?;
        url::Url::parse(&output)
            .map_err(|err| RestyleError::Service(format!("invalid output_url: {err}")))?;
        Ok(output)
    }
}

impl TransformAdapter for HttpTransformAdapter {
    fn restyle(&self, image_path: &Path, prompt: &str) -> Result<String, RestyleError> {
        self.post_image(RESTYLE_ENDPOINT, image_path, Some(prompt))
    }

    fn enhance(&self, image_path: &Path) -> Result<String, RestyleError> {
        self.post_image(ENHANCE_ENDPOINT, image_path, None)
    }

    fn download(&self, url: &str, dest: &Path) -> Result<(), RestyleError> {
        let response = self.client.get(url).send()?;
        if !response.status().is_success() {
            return Err(RestyleError::UnexpectedStatus(response.status()));
        }
        let bytes = response.bytes()?;
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(dest, &bytes)?;
        Ok(())
    }
}
