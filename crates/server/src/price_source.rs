use std::time::Duration;

use async_trait::async_trait;
use pharmabot_core::pricelist::{PriceListError, PriceSource};

/// Fetches the vendor price page over HTTP.
pub struct HttpPriceSource {
    http: reqwest::Client,
    url: String,
}

impl HttpPriceSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, PriceListError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| PriceListError::Transport(error.to_string()))?;

        Ok(Self { http, url: url.into() })
    }
}

#[async_trait]
impl PriceSource for HttpPriceSource {
    async fn fetch_page(&self) -> Result<String, PriceListError> {
        let response = self.http.get(&self.url).send().await.map_err(map_request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(PriceListError::Status { status: status.as_u16() });
        }

        response.text().await.map_err(map_request_error)
    }

    fn origin(&self) -> &str {
        &self.url
    }
}

fn map_request_error(error: reqwest::Error) -> PriceListError {
    if error.is_timeout() {
        PriceListError::Timeout
    } else {
        PriceListError::Transport(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pharmabot_core::pricelist::{PriceListError, PriceSource};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::HttpPriceSource;

    #[tokio::test]
    async fn returns_page_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/product/price"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<table></table>"))
            .mount(&server)
            .await;

        let source =
            HttpPriceSource::new(format!("{}/product/price", server.uri()), Duration::from_secs(5))
                .expect("client should build");

        assert_eq!(source.fetch_page().await, Ok("<table></table>".to_owned()));
        assert!(source.origin().ends_with("/product/price"));
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let source = HttpPriceSource::new(server.uri(), Duration::from_secs(5))
            .expect("client should build");

        assert_eq!(source.fetch_page().await, Err(PriceListError::Status { status: 502 }));
    }

    #[tokio::test]
    async fn slow_page_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<table></table>")
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let source = HttpPriceSource::new(server.uri(), Duration::from_millis(50))
            .expect("client should build");

        assert_eq!(source.fetch_page().await, Err(PriceListError::Timeout));
    }
}
