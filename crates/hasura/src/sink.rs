use crate::mutation::{Mutation, Mutations};
use crate::response::check_response;
use anyhow::{bail, Context};
use devhub_processor::{DumpRecord, Post, PostSink, PostSnapshot};
use reqwest::{Client, IntoUrl, Url};
use serde::Serialize;
use std::fmt::{Debug, Formatter};
use tracing::{debug, instrument};


#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Request<'a, T> {
    query: &'a str,
    variables: Variables<'a, T>,
    operation_name: &'a str
}


#[derive(Serialize)]
struct Variables<'a, T> {
    object: &'a T
}


/// Writes indexed records through the Hasura GraphQL endpoint,
/// one upsert mutation per record.
#[derive(Clone)]
pub struct HasuraSink {
    http: Client,
    url: Url,
    role: String,
    admin_secret: Option<String>,
    mutations: Mutations
}


impl Debug for HasuraSink {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HasuraSink")
            .field("url", &self.url.as_str())
            .field("role", &self.role)
            .finish()
    }
}


impl HasuraSink {
    pub fn new(http: Client, url: impl IntoUrl, role: impl Into<String>, table_prefix: &str) -> anyhow::Result<Self> {
        let url = url.into_url().context("invalid graphql endpoint url")?;
        Ok(Self {
            http,
            url,
            role: role.into(),
            admin_secret: None,
            mutations: Mutations::new(table_prefix)
        })
    }

    pub fn with_admin_secret(mut self, secret: impl Into<String>) -> Self {
        self.admin_secret = Some(secret.into());
        self
    }

    pub fn mutations(&self) -> &Mutations {
        &self.mutations
    }

    #[instrument(level = "debug", skip_all, err(Debug), fields(operation = mutation.operation_name))]
    async fn execute<T: Serialize>(&self, mutation: &Mutation, object: &T) -> anyhow::Result<()> {
        let body = Request {
            query: &mutation.document,
            variables: Variables {
                object
            },
            operation_name: mutation.operation_name
        };

        let mut req = self.http
            .post(self.url.clone())
            .header("x-hasura-role", &self.role)
            .json(&body);

        if let Some(secret) = self.admin_secret.as_ref() {
            req = req.header("x-hasura-admin-secret", secret);
        }

        let res = req.send().await?;
        let status = res.status();
        let bytes = res.bytes().await?;
        debug!(status = status.as_u16(), "got response");

        if !status.is_success() {
            bail!("got HTTP {}: {}", status.as_u16(), String::from_utf8_lossy(&bytes))
        }

        check_response(&bytes)
    }
}


impl PostSink for HasuraSink {
    async fn upsert_dump(&self, dump: &DumpRecord) -> anyhow::Result<()> {
        self.execute(&self.mutations.dumps, dump).await
    }

    async fn upsert_post(&self, post: &Post) -> anyhow::Result<()> {
        self.execute(&self.mutations.posts, post).await
    }

    async fn upsert_post_snapshot(&self, snapshot: &PostSnapshot) -> anyhow::Result<()> {
        self.execute(&self.mutations.post_snapshots, snapshot).await
    }
}
