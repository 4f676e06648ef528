use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::error::FetchError;

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
const TIMEOUT: Duration = Duration::from_secs(30);

/// Download the settlements listing page.
pub async fn fetch_listing(url: &str) -> Result<String, FetchError> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(TIMEOUT)
        .build()?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}").unwrap());
    pb.set_message(format!("Fetching {}", url));
    pb.enable_steady_tick(Duration::from_millis(100));

    info!("Fetching listing: {}", url);
    let result = get(&client, url).await;
    pb.finish_and_clear();

    let html = result?;
    info!(bytes = html.len(), "fetched listing");
    Ok(html)
}

async fn get(client: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    let resp = client.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(resp.text().await?)
}

/// Read a previously saved copy of the listing instead of going to the network.
pub fn read_saved(path: &Path) -> Result<String, FetchError> {
    info!(path = %path.display(), "reading saved listing");
    Ok(std::fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_saved_fixture() {
        let html = read_saved(Path::new("tests/fixtures/listing.html")).unwrap();
        assert!(html.contains("data-name"));
    }

    #[test]
    fn missing_saved_file_is_io_error() {
        let err = read_saved(Path::new("tests/fixtures/nope.html")).unwrap_err();
        assert!(matches!(err, FetchError::Io(_)));
    }
}
