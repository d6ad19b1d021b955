use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use tcgwatch_core::config::ApiConfig;
use tcgwatch_core::error::WatchError;

use crate::{
    ExtendedData, MarketplaceApi, RemoteCondition, RemoteGroup, RemoteLanguage, RemotePrinting,
    RemoteProduct, RemoteRarity, RemoteSku, RemoteSkuPrice,
};

const HOST: &str = "api.tcgplayer.com";

/// HTTP client for the TCGplayer catalog and pricing API.
pub struct TcgplayerClient {
    client: reqwest::Client,
    base_url: url::Url,
    version: String,
}

impl TcgplayerClient {
    /// Exchange the key pair for a bearer token and build an authorized client.
    pub async fn connect(api: &ApiConfig, private_key: &str) -> Result<Self, WatchError> {
        let token = request_token(&api.base_url, &api.public_key, private_key).await?;
        Self::with_token(api.base_url.clone(), api.version.clone(), &token)
    }

    /// Build a client around an already issued bearer token.
    pub fn with_token(base_url: url::Url, version: String, token: &str) -> Result<Self, WatchError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_static(concat!("tcgwatch/", env!("CARGO_PKG_VERSION"))),
        );
        let bearer = HeaderValue::from_str(&format!("bearer {token}")).map_err(|e| {
            WatchError::AuthFailed {
                host: HOST.to_string(),
                message: format!("invalid token: {e}"),
            }
        })?;
        headers.insert(header::AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| WatchError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            version,
        })
    }

    fn url(&self, path: &str) -> String {
        versioned_url(&self.base_url, &self.version, path)
    }

    /// GET a `{success, errors, results}` envelope and return its results.
    async fn get_results<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, WatchError> {
        let url = self.url(path);
        tracing::debug!(%url, ?query, "GET");
        let resp = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| WatchError::ApiError {
                status: 0,
                message: e.to_string(),
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| WatchError::ApiError {
            status: status.as_u16(),
            message: e.to_string(),
        })?;
        decode_envelope(status, &body)
    }
}

fn versioned_url(base: &url::Url, version: &str, path: &str) -> String {
    let base = base.as_str().trim_end_matches('/');
    let version = version.trim_matches('/');
    if version.is_empty() {
        format!("{base}{path}")
    } else {
        format!("{base}/{version}{path}")
    }
}

/// Turn a response into results, mapping HTTP and envelope failures to errors.
///
/// The API answers an out-of-range page with 404 and a "no ... found" error;
/// that is an empty page, not a failure.
fn decode_envelope<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<Vec<T>, WatchError> {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            return Err(WatchError::AuthFailed {
                host: HOST.to_string(),
                message: body.to_string(),
            })
        }
        StatusCode::TOO_MANY_REQUESTS => {
            return Err(WatchError::RateLimited {
                host: HOST.to_string(),
                retry_after_secs: 60,
            })
        }
        _ => {}
    }

    let envelope: Envelope<T> = match serde_json::from_str(body) {
        Ok(env) => env,
        Err(e) if status.is_success() => {
            return Err(WatchError::ApiError {
                status: status.as_u16(),
                message: format!("JSON parse error: {e}"),
            })
        }
        Err(_) => {
            return Err(WatchError::ApiError {
                status: status.as_u16(),
                message: body.to_string(),
            })
        }
    };

    if status == StatusCode::NOT_FOUND && envelope.results.is_empty() {
        return Ok(Vec::new());
    }
    if !status.is_success() || !envelope.success {
        return Err(WatchError::ApiError {
            status: status.as_u16(),
            message: envelope.errors.join("; "),
        });
    }
    Ok(envelope.results)
}

async fn request_token(
    base_url: &url::Url,
    public_key: &str,
    private_key: &str,
) -> Result<String, WatchError> {
    if public_key.is_empty() || private_key.is_empty() {
        return Err(WatchError::AuthFailed {
            host: HOST.to_string(),
            message: "public and private key are required".to_string(),
        });
    }

    let url = versioned_url(base_url, "", "/token");
    let resp = reqwest::Client::new()
        .post(&url)
        .form(&[
            ("grant_type", "client_credentials"),
            ("client_id", public_key),
            ("client_secret", private_key),
        ])
        .send()
        .await
        .map_err(|e| WatchError::ApiError {
            status: 0,
            message: e.to_string(),
        })?;

    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        return Err(WatchError::AuthFailed {
            host: HOST.to_string(),
            message: format!("token request failed ({status}): {body}"),
        });
    }

    let token: TokenResponse = resp.json().await.map_err(|e| WatchError::AuthFailed {
        host: HOST.to_string(),
        message: format!("JSON parse error: {e}"),
    })?;
    tracing::info!(expires_in = token.expires_in, "obtained API token");
    Ok(token.access_token)
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    errors: Vec<String>,
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TcgGroup {
    group_id: i64,
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TcgRarity {
    rarity_id: i64,
    display_text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TcgPrinting {
    printing_id: i64,
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TcgCondition {
    condition_id: i64,
    name: String,
    #[serde(default)]
    abbreviation: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TcgLanguage {
    language_id: i64,
    name: String,
    #[serde(default)]
    abbr: String,
}

#[derive(Deserialize)]
struct TcgExtendedData {
    name: String,
    #[serde(default)]
    value: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TcgSku {
    sku_id: i64,
    product_id: i64,
    language_id: i64,
    printing_id: i64,
    condition_id: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TcgProduct {
    product_id: i64,
    name: String,
    #[serde(default)]
    clean_name: Option<String>,
    #[serde(default)]
    image_url: String,
    group_id: i64,
    #[serde(default)]
    url: String,
    #[serde(default)]
    extended_data: Vec<TcgExtendedData>,
    #[serde(default)]
    skus: Vec<TcgSku>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TcgSkuPrice {
    sku_id: i64,
    low_price: Option<f64>,
    lowest_shipping: Option<f64>,
}

impl From<TcgSku> for RemoteSku {
    fn from(s: TcgSku) -> Self {
        RemoteSku {
            remote_id: s.sku_id,
            product_remote_id: s.product_id,
            printing_remote_id: s.printing_id,
            condition_remote_id: s.condition_id,
            language_remote_id: s.language_id,
        }
    }
}

impl From<TcgProduct> for RemoteProduct {
    fn from(p: TcgProduct) -> Self {
        RemoteProduct {
            remote_id: p.product_id,
            group_remote_id: p.group_id,
            clean_name: p.clean_name.unwrap_or_else(|| p.name.clone()),
            name: p.name,
            image_url: p.image_url,
            url: p.url,
            extended_data: p
                .extended_data
                .into_iter()
                .map(|d| ExtendedData {
                    name: d.name,
                    value: d.value,
                })
                .collect(),
            skus: p.skus.into_iter().map(RemoteSku::from).collect(),
        }
    }
}

#[async_trait]
impl MarketplaceApi for TcgplayerClient {
    async fn list_groups(
        &self,
        category_id: u32,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<RemoteGroup>, WatchError> {
        let path = format!("/catalog/categories/{category_id}/groups");
        let groups: Vec<TcgGroup> = self
            .get_results(
                &path,
                &[("limit", limit.to_string()), ("offset", offset.to_string())],
            )
            .await?;
        Ok(groups
            .into_iter()
            .map(|g| RemoteGroup {
                remote_id: g.group_id,
                name: g.name,
            })
            .collect())
    }

    async fn list_rarities(&self, category_id: u32) -> Result<Vec<RemoteRarity>, WatchError> {
        let path = format!("/catalog/categories/{category_id}/rarities");
        let rarities: Vec<TcgRarity> = self.get_results(&path, &[]).await?;
        Ok(rarities
            .into_iter()
            .map(|r| RemoteRarity {
                remote_id: r.rarity_id,
                name: r.display_text,
            })
            .collect())
    }

    async fn list_printings(&self, category_id: u32) -> Result<Vec<RemotePrinting>, WatchError> {
        let path = format!("/catalog/categories/{category_id}/printings");
        let printings: Vec<TcgPrinting> = self.get_results(&path, &[]).await?;
        Ok(printings
            .into_iter()
            .map(|p| RemotePrinting {
                remote_id: p.printing_id,
                name: p.name,
            })
            .collect())
    }

    async fn list_conditions(&self, category_id: u32) -> Result<Vec<RemoteCondition>, WatchError> {
        let path = format!("/catalog/categories/{category_id}/conditions");
        let conditions: Vec<TcgCondition> = self.get_results(&path, &[]).await?;
        Ok(conditions
            .into_iter()
            .map(|c| RemoteCondition {
                remote_id: c.condition_id,
                name: c.name,
                abbreviation: c.abbreviation,
            })
            .collect())
    }

    async fn list_languages(&self, category_id: u32) -> Result<Vec<RemoteLanguage>, WatchError> {
        let path = format!("/catalog/categories/{category_id}/languages");
        let languages: Vec<TcgLanguage> = self.get_results(&path, &[]).await?;
        Ok(languages
            .into_iter()
            .map(|l| RemoteLanguage {
                remote_id: l.language_id,
                name: l.name,
                abbreviation: l.abbr,
            })
            .collect())
    }

    async fn list_products(
        &self,
        category_id: u32,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<RemoteProduct>, WatchError> {
        let products: Vec<TcgProduct> = self
            .get_results(
                "/catalog/products",
                &[
                    ("categoryId", category_id.to_string()),
                    ("limit", limit.to_string()),
                    ("offset", offset.to_string()),
                    ("getExtendedFields", "true".to_string()),
                    ("includeSkus", "true".to_string()),
                ],
            )
            .await?;
        Ok(products.into_iter().map(RemoteProduct::from).collect())
    }

    async fn list_product_skus(&self, product_remote_id: i64) -> Result<Vec<RemoteSku>, WatchError> {
        let path = format!("/catalog/products/{product_remote_id}/skus");
        let skus: Vec<TcgSku> = self.get_results(&path, &[]).await?;
        Ok(skus.into_iter().map(RemoteSku::from).collect())
    }

    async fn list_sku_prices(&self, sku_remote_ids: &[i64]) -> Result<Vec<RemoteSkuPrice>, WatchError> {
        if sku_remote_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = sku_remote_ids.iter().map(|id| id.to_string()).collect();
        let path = format!("/pricing/sku/{}", ids.join(","));
        let prices: Vec<TcgSkuPrice> = self.get_results(&path, &[]).await?;
        Ok(prices
            .into_iter()
            .map(|p| RemoteSkuPrice {
                sku_remote_id: p.sku_id,
                low_price: p.low_price,
                lowest_shipping: p.lowest_shipping,
            })
            .collect())
    }
}
