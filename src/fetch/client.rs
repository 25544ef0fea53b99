use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes HTTP requests. Decorators such as [`ApiKey`](super::auth::ApiKey)
/// wrap another implementation to adjust requests before they are sent.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
