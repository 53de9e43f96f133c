use anyhow::Context;
use protocol::{
    ConsoleAck, ConsoleInput, ConsoleOutput, ParsedOutput, RunConfig, RunOutcome, UploadResponse,
};
use std::path::Path;

/// Thin wrapper over the backend's HTTP JSON API. One instance per process,
/// shared by the controller and its spawned tasks.
pub(crate) struct ApiClient {
    http: reqwest::Client,
    base: String,
}

impl ApiClient {
    pub(crate) fn new(base: impl Into<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("failed to build http client")?;
        let mut base = base.into();
        while base.ends_with('/') {
            base.pop();
        }
        Ok(Self { http, base })
    }

    pub(crate) async fn save_config(&self, config: &RunConfig) -> anyhow::Result<()> {
        let response = self
            .http
            .post(format!("{}/api/config", self.base))
            .json(config)
            .send()
            .await
            .context("config request failed")?;
        // The body is acknowledged but carries nothing the client uses.
        let _ = response.json::<serde_json::Value>().await;
        Ok(())
    }

    pub(crate) async fn run(&self) -> anyhow::Result<RunOutcome> {
        self.http
            .post(format!("{}/api/run", self.base))
            .send()
            .await
            .context("run request failed")?
            .json()
            .await
            .context("run response was not json")
    }

    pub(crate) async fn upload_input(&self, path: &Path) -> anyhow::Result<UploadResponse> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "input".to_string());
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);
        self.http
            .post(format!("{}/api/upload_input", self.base))
            .multipart(form)
            .send()
            .await
            .context("upload request failed")?
            .json()
            .await
            .context("upload response was not json")
    }

    pub(crate) async fn parsed_output(&self) -> anyhow::Result<ParsedOutput> {
        self.http
            .get(format!("{}/api/output_parsed", self.base))
            .send()
            .await
            .context("output request failed")?
            .json()
            .await
            .context("output response was not json")
    }

    pub(crate) async fn console_start(&self) -> anyhow::Result<ConsoleAck> {
        self.http
            .post(format!("{}/api/console/start", self.base))
            .send()
            .await
            .context("console start failed")?
            .json()
            .await
            .context("console start response was not json")
    }

    pub(crate) async fn console_stop(&self) -> anyhow::Result<ConsoleAck> {
        self.http
            .post(format!("{}/api/console/stop", self.base))
            .send()
            .await
            .context("console stop failed")?
            .json()
            .await
            .context("console stop response was not json")
    }

    pub(crate) async fn console_output(&self) -> anyhow::Result<ConsoleOutput> {
        self.http
            .get(format!("{}/api/console/output", self.base))
            .send()
            .await
            .context("console output failed")?
            .json()
            .await
            .context("console output response was not json")
    }

    pub(crate) async fn console_input(&self, input: &ConsoleInput) -> anyhow::Result<ConsoleAck> {
        self.http
            .post(format!("{}/api/console/input", self.base))
            .json(input)
            .send()
            .await
            .context("console input failed")?
            .json()
            .await
            .context("console input response was not json")
    }

    pub(crate) async fn download_output(&self, dest: &Path) -> anyhow::Result<()> {
        let bytes = self
            .http
            .get(format!("{}/download/output", self.base))
            .send()
            .await
            .context("download request failed")?
            .bytes()
            .await
            .context("download body failed")?;
        tokio::fs::write(dest, &bytes)
            .await
            .with_context(|| format!("failed to write {}", dest.display()))?;
        Ok(())
    }
}
