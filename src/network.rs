use crate::error::FetchError;
use crate::options::Settings;
use crate::report::Outcome;
use reqwest::StatusCode;
use reqwest::header::LOCATION;
use url::Url;

/// Builds and configures the HTTP client based on the resolved settings.
///
/// Automatic redirects are disabled: [`fetch_following_redirects`] follows them itself so
/// it can record the redirect status. No timeout is set unless one is configured.
///
/// # Arguments
///
/// * `settings` - The resolved settings carrying the user agent and the optional timeout.
///
/// # Returns
///
/// A `Result` containing the built `Client` if successful, or the `reqwest::Error` raised
/// by the builder otherwise.
pub fn build_client(settings: &Settings) -> Result<reqwest::Client, reqwest::Error> {
    let mut client_builder = reqwest::Client::builder()
        .user_agent(settings.user_agent.as_str())
        .redirect(reqwest::redirect::Policy::none());

    if let Some(timeout) = settings.request_timeout {
        client_builder = client_builder.timeout(timeout);
    }

    client_builder.build()
}

/// The last response of a request chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalResponse {
    /// Status of the response itself.
    pub status: StatusCode,
    /// URL that produced this response.
    pub url: Url,
    /// Status of the first 301 or 302 hop in the chain, if there was one.
    pub redirect_status: Option<StatusCode>,
}

impl FinalResponse {
    /// The status shown in reports: a 301/302 hop wins over the final status.
    pub fn reported_status(&self) -> StatusCode {
        self.redirect_status.unwrap_or(self.status)
    }
}

/// Redirect codes that are followed.
pub fn is_followed_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

/// Redirect codes that are recorded on the final response. Other redirects are followed silently.
pub fn is_recorded_redirect(status: StatusCode) -> bool {
    matches!(status, StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND)
}

fn redirect_target(response: &reqwest::Response) -> Option<Url> {
    let location = response.headers().get(LOCATION)?.to_str().ok()?;
    response.url().join(location).ok()
}

/// Requests `url` and follows up to `max_hops` redirects.
///
/// One attempt per hop, no retries. A redirect without a usable `Location` header ends the
/// chain and is returned as is. Response bodies are never read.
///
/// # Arguments
///
/// * `client` - A client built by [`build_client`], with automatic redirects disabled.
/// * `url` - The URL taken from the sitemap.
/// * `max_hops` - Maximum number of redirects followed before giving up.
///
/// # Returns
///
/// The [`FinalResponse`] of the chain. Its `redirect_status` holds the first 301 or 302
/// met on the way.
///
/// # Errors
///
/// - [`FetchError::InvalidUrl`] if `url` cannot be parsed.
/// - [`FetchError::Network`] if a request fails (DNS, connection, timeout, protocol).
/// - [`FetchError::TooManyRedirects`] if the chain is longer than `max_hops`.
///
/// The last two carry the last response obtained on an earlier hop, if any.
pub async fn fetch_following_redirects(
    client: &reqwest::Client,
    url: &str,
    max_hops: usize,
) -> Result<FinalResponse, FetchError> {
    let mut current = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;
    let mut redirect_status = None;
    let mut last = None;
    let mut hops = 0;

    loop {
        let response = match client.get(current.clone()).send().await {
            Ok(response) => response,
            Err(source) => return Err(FetchError::Network { source, last }),
        };

        let status = response.status();
        if redirect_status.is_none() && is_recorded_redirect(status) {
            redirect_status = Some(status);
        }
        let next = redirect_target(&response).filter(|_| is_followed_redirect(status));
        let reached = FinalResponse {
            status,
            url: response.url().clone(),
            redirect_status,
        };

        let Some(next) = next else {
            return Ok(reached);
        };
        if hops == max_hops {
            return Err(FetchError::TooManyRedirects {
                max_hops,
                last: Some(reached),
            });
        }

        tracing::debug!(from = %reached.url, to = %next, status = status.as_u16(), "following redirect");
        hops += 1;
        last = Some(reached);
        current = next;
    }
}

/// Verifies a single sitemap URL and classifies the outcome.
///
/// Failures never escape: the last response obtained is reported instead, and when no
/// response was obtained at all the outcome is an `ERROR` pointing at the requested URL.
/// Failures are only logged at debug level; the outcome already records them.
///
/// # Arguments
///
/// * `client` - A client built by [`build_client`].
/// * `url` - The URL taken from the sitemap, reported back as `requested_url`.
/// * `max_hops` - Maximum number of redirects followed.
pub async fn verify(client: &reqwest::Client, url: &str, max_hops: usize) -> Outcome {
    match fetch_following_redirects(client, url, max_hops).await {
        Ok(response) => Outcome::from_response(url, &response),
        Err(e) => {
            tracing::debug!(url, error = %e, "verification failed");
            match e.last_response() {
                Some(response) => Outcome::from_response(url, response),
                None => Outcome::error(url),
            }
        }
    }
}
