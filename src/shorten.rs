use serde::Deserialize;

/// URLs shorter than this are sent as-is.
const SHORTEN_THRESHOLD: usize = 50;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShortenResponse {
    #[serde(default)]
    short_url: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Run a long avatar URL through the shorten proxy before it rides along on
/// create/join. Any failure falls back to the original URL; shortening is
/// never allowed to block entering a room.
pub async fn shorten_avatar_url(endpoint: &str, url: &str) -> String {
    if url.len() < SHORTEN_THRESHOLD {
        return url.to_string();
    }

    match request_short_url(endpoint, url).await {
        Ok(short_url) => {
            log::info!("Shortened avatar URL to {short_url}");
            short_url
        }
        Err(err) => {
            log::warn!("Avatar URL shortening failed, using original: {err}");
            url.to_string()
        }
    }
}

async fn request_short_url(endpoint: &str, url: &str) -> Result<String, String> {
    let client = reqwest::Client::new();
    let response = client
        .post(endpoint)
        .json(&serde_json::json!({ "url": url }))
        .send()
        .await
        .map_err(|err| err.to_string())?;

    if !response.status().is_success() {
        return Err(format!("proxy returned {}", response.status()));
    }

    let body: ShortenResponse = response.json().await.map_err(|err| err.to_string())?;
    if let Some(error) = body.error {
        return Err(error);
    }
    body.short_url.ok_or_else(|| "proxy response missing shortUrl".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn short_urls_pass_through_untouched() {
        let url = "https://short.example/a.png";
        assert!(url.len() < SHORTEN_THRESHOLD);
        // Endpoint is never contacted for short URLs; an unroutable one proves it.
        let result = shorten_avatar_url("http://127.0.0.1:0/shorten", url).await;
        assert_eq!(result, url);
    }

    #[tokio::test]
    async fn proxy_failure_falls_back_to_original() {
        let url = "https://cdn.example.com/avatars/very/long/path/to/some/image-file.png";
        assert!(url.len() >= SHORTEN_THRESHOLD);
        let result = shorten_avatar_url("http://127.0.0.1:1/unreachable", url).await;
        assert_eq!(result, url);
    }

    #[test]
    fn shorten_response_parses_both_shapes() {
        let ok: ShortenResponse =
            serde_json::from_str(r#"{"shortUrl": "https://tiny.url/x"}"#).unwrap();
        assert_eq!(ok.short_url.as_deref(), Some("https://tiny.url/x"));

        let err: ShortenResponse = serde_json::from_str(r#"{"error": "bad url"}"#).unwrap();
        assert_eq!(err.error.as_deref(), Some("bad url"));
    }
}
