//! `GET` transport for connections served over plain HTTP.

use contracts::shared::connection::{ConnectionPage, QueryArguments};
use gloo_net::http::Request;
use serde::de::DeserializeOwned;

use super::error::ConnectionError;
use super::fetcher::QueryConnection;

/// Origin of the current page, e.g. `https://example.com:8080`.
///
/// Empty outside a browser window, which leaves paths relative.
pub fn api_base() -> String {
    web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_default()
}

/// `{base}{path}?{args}` with the arguments encoded by `serde_qs`.
pub fn build_url(base: &str, path: &str, args: &QueryArguments) -> Result<String, ConnectionError> {
    let query = serde_qs::to_string(args).map_err(|e| ConnectionError::Transport(e.to_string()))?;
    if query.is_empty() {
        Ok(format!("{}{}", base, path))
    } else {
        Ok(format!("{}{}?{}", base, path, query))
    }
}

pub async fn fetch_page<N: DeserializeOwned>(url: &str) -> Result<ConnectionPage<N>, ConnectionError> {
    let response = Request::get(url)
        .send()
        .await
        .map_err(|e| ConnectionError::Transport(e.to_string()))?;

    if !response.ok() {
        return Err(ConnectionError::Transport(format!(
            "{} returned {}",
            url,
            response.status()
        )));
    }

    response
        .json::<ConnectionPage<N>>()
        .await
        .map_err(|e| ConnectionError::Decode(e.to_string()))
}

/// Query function loading pages from `path` on the current origin.
pub fn http_query_connection<N>(path: &str) -> impl QueryConnection<N>
where
    N: DeserializeOwned + 'static,
{
    let base = api_base();
    let path = path.to_string();
    move |args: QueryArguments| {
        let url = build_url(&base, &path, &args);
        async move { fetch_page::<N>(&url?).await }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url() {
        let args = QueryArguments::new().with("first", 10).with("query", "repo");
        assert_eq!(
            build_url("http://localhost:3000", "/api/contexts", &args).unwrap(),
            "http://localhost:3000/api/contexts?first=10&query=repo"
        );
        assert_eq!(
            build_url("", "/api/contexts", &QueryArguments::new()).unwrap(),
            "/api/contexts"
        );
    }
}
