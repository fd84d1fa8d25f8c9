use async_trait::async_trait;
use common::cabin::{Cabin, CabinId, CabinRow};
use common::table::{CabinTable, TableError};
use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::join_segments;

/// Ask PostgREST to return a single JSON object instead of an array.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
/// Returned with 406 when a single-object request matched no row.
const NO_ROWS_CODE: &str = "PGRST116";

#[derive(Deserialize)]
struct PostgrestErrorBody {
    code: Option<String>,
    message: Option<String>,
}

/// Cabin table served by PostgREST under `<base>/rest/v1/<table>`.
#[derive(Clone)]
pub struct PostgrestTable {
    http: Client,
    url: Url,
}

impl PostgrestTable {
    pub fn new(http: Client, base: Url, table: &str) -> Self {
        Self {
            http,
            url: join_segments(&base, &["rest", "v1", table]),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    fn returning(builder: RequestBuilder) -> RequestBuilder {
        builder
            .query(&[("select", "*")])
            .header("Prefer", "return=representation")
    }

    fn by_id(builder: RequestBuilder, id: CabinId) -> RequestBuilder {
        builder.query(&[("id", format!("eq.{id}"))])
    }

    async fn send<T: DeserializeOwned>(
        builder: RequestBuilder,
        id: Option<CabinId>,
    ) -> Result<T, TableError> {
        let response = builder
            .send()
            .await
            .map_err(|e| TableError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(api_error(response, id).await);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TableError::Transport(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| TableError::Decode(e.to_string()))
    }
}

async fn api_error(response: Response, id: Option<CabinId>) -> TableError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();

    match serde_json::from_str::<PostgrestErrorBody>(&text) {
        Ok(body) => {
            if let (Some(id), Some(NO_ROWS_CODE)) = (id, body.code.as_deref()) {
                return TableError::NotFound(id);
            }
            TableError::Api {
                status,
                message: body.message.unwrap_or(text),
                code: body.code,
            }
        }
        Err(_) => TableError::Api {
            status,
            code: None,
            message: text,
        },
    }
}

#[async_trait]
impl CabinTable for PostgrestTable {
    async fn select_all(&self) -> Result<Vec<Cabin>, TableError> {
        let request = self.http.get(self.url.clone()).query(&[("select", "*")]);
        let rows: Vec<Cabin> = Self::send(request, None).await?;
        debug!(count = rows.len(), "Selected cabins");
        Ok(rows)
    }

    async fn insert(&self, row: &CabinRow) -> Result<Cabin, TableError> {
        let request = Self::returning(self.http.post(self.url.clone()))
            .header(ACCEPT, HeaderValue::from_static(SINGLE_OBJECT))
            .json(row);
        Self::send(request, None).await
    }

    async fn update(&self, id: CabinId, row: &CabinRow) -> Result<Cabin, TableError> {
        let request = Self::by_id(Self::returning(self.http.patch(self.url.clone())), id)
            .header(ACCEPT, HeaderValue::from_static(SINGLE_OBJECT))
            .json(row);
        Self::send(request, Some(id)).await
    }

    async fn delete(&self, id: CabinId) -> Result<Vec<Cabin>, TableError> {
        let request = Self::by_id(Self::returning(self.http.delete(self.url.clone())), id);
        Self::send(request, None).await
    }
}
