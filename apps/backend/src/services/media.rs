//! S3/R2 blob storage, AI cover generation and link shortening.

use std::path::PathBuf;

use async_trait::async_trait;
use aws_sdk_s3::{
    config::{Credentials, Region},
    primitives::ByteStream,
    Client, Config,
};
use chrono::Utc;
use serde::Deserialize;

use crate::gateway::{GatewayError, GatewayResult, MediaGateway};

/// Production media gateway backed by S3-compatible storage, an
/// OpenAI-style image generation API and an HTTP link shortener.
pub struct MediaService {
    client: Client,
    bucket: String,
    public_url: String,
    http: reqwest::Client,
    image_api_url: String,
    image_api_key: Option<String>,
    shortener_url: Option<String>,
    cache_dir: PathBuf,
}

impl MediaService {
    /// Create a new media service from environment variables.
    ///
    /// Required env vars:
    /// - S3_BUCKET: Bucket name
    /// - S3_ACCESS_KEY: Access key ID
    /// - S3_SECRET_KEY: Secret access key
    /// - S3_PUBLIC_URL: Base URL objects are served from
    ///
    /// Optional:
    /// - S3_REGION: Region (use "auto" for Cloudflare R2)
    /// - S3_ENDPOINT: Custom endpoint URL (required for R2)
    /// - IMAGE_API_URL: Image generation API base URL
    /// - IMAGE_API_KEY: Image generation API key
    /// - SHORTENER_URL: Link shortener endpoint
    /// - IMAGE_CACHE_DIR: Local cache for generated images
    pub async fn new() -> GatewayResult<Self> {
        let bucket = std::env::var("S3_BUCKET")
            .map_err(|_| GatewayError::new("S3_BUCKET not set"))?;

        let region = std::env::var("S3_REGION").unwrap_or_else(|_| "auto".to_string());

        let endpoint = std::env::var("S3_ENDPOINT").ok();

        let access_key = std::env::var("S3_ACCESS_KEY")
            .map_err(|_| GatewayError::new("S3_ACCESS_KEY not set"))?;

        let secret_key = std::env::var("S3_SECRET_KEY")
            .map_err(|_| GatewayError::new("S3_SECRET_KEY not set"))?;

        let public_url = std::env::var("S3_PUBLIC_URL")
            .map_err(|_| GatewayError::new("S3_PUBLIC_URL not set"))?;

        let credentials = Credentials::new(
            access_key,
            secret_key,
            None,  // session token
            None,  // expiry
            "env", // provider name
        );

        let mut config_builder = Config::builder()
            .region(Region::new(region))
            .credentials_provider(credentials)
            .behavior_version_latest();

        // Set custom endpoint for R2 or other S3-compatible services
        if let Some(endpoint_url) = endpoint {
            config_builder = config_builder.endpoint_url(endpoint_url);
        }

        let config = config_builder.build();
        let client = Client::from_conf(config);

        let image_api_url = std::env::var("IMAGE_API_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let image_api_key = std::env::var("IMAGE_API_KEY").ok();
        let shortener_url = std::env::var("SHORTENER_URL").ok();
        let cache_dir = std::env::var("IMAGE_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data/image_cache"));

        Ok(Self {
            client,
            bucket,
            public_url,
            http: reqwest::Client::new(),
            image_api_url,
            image_api_key,
            shortener_url,
            cache_dir,
        })
    }
}

#[derive(Deserialize)]
struct GeneratedImage {
    url: String,
}

#[derive(Deserialize)]
struct GenerationResponse {
    data: Vec<GeneratedImage>,
}

#[derive(Deserialize)]
struct ShortenResponse {
    short_url: String,
}

#[async_trait]
impl MediaGateway for MediaService {
    async fn upload(&self, bytes: &[u8], folder: &str) -> GatewayResult<String> {
        let key = format!("{}/{}.jpg", folder, Utc::now().timestamp_millis());
        let body = ByteStream::from(bytes.to_vec());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(body)
            .content_type("image/jpeg")
            .send()
            .await
            .map_err(|e| GatewayError::new(format!("S3 upload failed: {}", e)))?;

        tracing::info!("Uploaded image to S3: {}", key);
        Ok(format!("{}/{}", self.public_url.trim_end_matches('/'), key))
    }

    async fn generate_image(&self, prompt: &str) -> GatewayResult<PathBuf> {
        let api_key = self
            .image_api_key
            .as_deref()
            .ok_or_else(|| GatewayError::new("IMAGE_API_KEY not set"))?;

        let response = self
            .http
            .post(format!("{}/images/generations", self.image_api_url))
            .bearer_auth(api_key)
            .json(&serde_json::json!({
                "model": "dall-e-3",
                "prompt": prompt,
                "n": 1,
                "size": "1024x1024",
            }))
            .send()
            .await
            .map_err(|e| GatewayError::new(format!("image API request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| GatewayError::new(format!("image API error: {}", e)))?
            .json::<GenerationResponse>()
            .await
            .map_err(|e| GatewayError::new(format!("image API response malformed: {}", e)))?;

        let url = response
            .data
            .first()
            .map(|image| image.url.clone())
            .ok_or_else(|| GatewayError::new("image API returned no images"))?;

        let bytes = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| GatewayError::new(format!("image download failed: {}", e)))?
            .bytes()
            .await
            .map_err(|e| GatewayError::new(format!("image download failed: {}", e)))?;

        tokio::fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| GatewayError::new(format!("image cache unavailable: {}", e)))?;

        let path = self
            .cache_dir
            .join(format!("generated_image_{}.png", Utc::now().timestamp_millis()));

        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| GatewayError::new(format!("image cache write failed: {}", e)))?;

        tracing::info!("Cached generated image at {}", path.display());
        Ok(path)
    }

    async fn shorten_link(&self, long_url: &str) -> GatewayResult<String> {
        let endpoint = self
            .shortener_url
            .as_deref()
            .ok_or_else(|| GatewayError::new("SHORTENER_URL not set"))?;

        let response = self
            .http
            .post(endpoint)
            .json(&serde_json::json!({ "url": long_url }))
            .send()
            .await
            .map_err(|e| GatewayError::new(format!("shortener request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| GatewayError::new(format!("shortener error: {}", e)))?
            .json::<ShortenResponse>()
            .await
            .map_err(|e| GatewayError::new(format!("shortener response malformed: {}", e)))?;

        Ok(response.short_url)
    }
}
