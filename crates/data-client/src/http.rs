use crate::lines::read_lines;
use crate::types::{BlockRange, DataClient, LineStream};
use anyhow::{anyhow, Context};
use futures::future::BoxFuture;
use futures::{StreamExt, TryStreamExt};
use reqwest::{Client, IntoUrl, Response, Url};
use std::fmt::{Debug, Formatter};
use std::io::{Error, ErrorKind};
use std::time::Duration;
use tokio_util::io::StreamReader;
use tracing::{debug, instrument};


pub fn default_http_client() -> anyhow::Result<Client> {
    Client::builder()
        .read_timeout(Duration::from_secs(20))
        .connect_timeout(Duration::from_secs(20))
        .gzip(true)
        .build()
        .context("failed to build http client")
}


/// Fetches blocks from a service that answers `POST {from, to}`
/// with newline delimited JSON blocks.
#[derive(Clone)]
pub struct ReqwestDataClient {
    http: Client,
    url: Url
}


impl Debug for ReqwestDataClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestDataClient")
            .field("url", &self.url.as_str())
            .finish()
    }
}


impl ReqwestDataClient {
    pub fn new(http: Client, url: impl IntoUrl) -> anyhow::Result<Self> {
        let url = url.into_url().context("invalid data source url")?;
        Ok(Self {
            http,
            url
        })
    }

    #[instrument(level = "debug", skip_all, err(Debug), fields(
        url = %self.url.as_str(),
        from = range.from,
        to = ?range.to
    ))]
    pub async fn stream(&self, range: BlockRange) -> anyhow::Result<LineStream> {
        debug!("send request");

        let res = self.http
            .post(self.url.clone())
            .json(&range)
            .send()
            .await?;

        match res.status().as_u16() {
            200 => Ok(into_lines(res)),
            204 => Ok(futures::stream::empty().boxed()),
            status if status < 300 => Err(
                anyhow!("unexpected success response status - {}", status)
            ),
            _ => Err(response_error(res).await)
        }
    }
}


fn into_lines(res: Response) -> LineStream {
    let byte_stream = res
        .bytes_stream()
        .map_err(|err| Error::new(ErrorKind::Other, err));

    read_lines(StreamReader::new(byte_stream))
}


async fn response_error(response: Response) -> anyhow::Error {
    let status = response.status().as_u16();
    if let Some(text) = response.text().await.ok() {
        anyhow!("got HTTP {}: {}", status, text)
    } else {
        anyhow!("got HTTP {}", status)
    }
}


impl DataClient for ReqwestDataClient {
    fn stream(&self, range: BlockRange) -> BoxFuture<'_, anyhow::Result<LineStream>> {
        Box::pin(self.stream(range))
    }
}
