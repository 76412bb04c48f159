use http::Extensions;
use log::{debug, error};
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next, Result};

/// Logs every non-success answer and every transport failure.
///
/// The response (or error) is passed through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFailures;

#[async_trait::async_trait]
impl Middleware for LogFailures {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        let method = req.method().clone();
        let url = req.url().clone();
        debug!("{} {}", method, url);

        match next.run(req, extensions).await {
            Ok(response) => {
                if !response.status().is_success() {
                    error!(
                        "Fetch error: {} {} -> {} {}",
                        method,
                        response.url(),
                        response.status().as_u16(),
                        response.status().canonical_reason().unwrap_or_default()
                    );
                }
                Ok(response)
            }
            Err(e) => {
                error!("Network error: {} {}: {}", method, url, e);
                Err(e)
            }
        }
    }
}
