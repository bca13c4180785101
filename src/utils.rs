use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::repository::DataLoadFailure;

pub async fn fetch_json<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T, DataLoadFailure> {
    let resp = client.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(DataLoadFailure::Status(status.as_u16()));
    }
    let bytes = resp.bytes().await?;
    let value = serde_json::from_slice(&bytes)?;
    Ok(value)
}
