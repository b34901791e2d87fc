use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes prepared HTTP requests. Auth wrappers layer on top of a base
/// client by implementing this trait themselves.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}

#[async_trait]
impl<C: HttpClient + ?Sized> HttpClient for Box<C> {
    async fn execute(&self, req: Request) -> reqwest::Result<Response> {
        (**self).execute(req).await
    }
}
