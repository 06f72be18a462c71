use std::fs;
use std::path::Path;

use log::debug;

use super::core::{CircleCiClient, CIRCLE_TOKEN};
use crate::auth::Token;
use crate::error::{CircleCiError, Result};

impl CircleCiClient {
    /// Download `url` to `destination`, following redirects.
    ///
    /// Parent directories are created as needed and the body is written
    /// verbatim. Returns the number of bytes written.
    pub async fn download(
        &self,
        url: &str,
        token: Option<&Token>,
        destination: &Path,
    ) -> Result<u64> {
        let mut request = self.client.get(url);
        if let Some(token) = token {
            request = request.header(CIRCLE_TOKEN, token.as_str());
        }

        let response = request.send().await?;
        let status = response.status();
        debug!("GET {url} -> {status} (final URL: {})", response.url());

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(CircleCiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;

        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(destination, &bytes)?;

        Ok(bytes.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use crate::auth::Token;
    use crate::client::CircleCiClient;
    use crate::config::ApiConfig;
    use crate::error::CircleCiError;
    use tempfile::TempDir;

    fn client_for(server: &mockito::ServerGuard) -> CircleCiClient {
        let config = ApiConfig {
            base_url: server.url(),
            ..ApiConfig::default()
        };
        CircleCiClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_download_follows_redirect_and_writes_bytes() {
        let mut server = mockito::Server::new_async().await;
        let client = client_for(&server);
        let temp_dir = TempDir::new().unwrap();

        let redirect = server
            .mock("GET", "/artifacts/report.bin")
            .match_header("Circle-Token", "tok")
            .with_status(302)
            .with_header("location", &format!("{}/storage/report.bin", server.url()))
            .create_async()
            .await;
        let storage = server
            .mock("GET", "/storage/report.bin")
            .with_status(200)
            .with_body(vec![0u8, 159, 146, 150, 10])
            .create_async()
            .await;

        let destination = temp_dir.path().join("nested").join("report.bin");
        let written = client
            .download(
                &format!("{}/artifacts/report.bin", server.url()),
                Some(&Token::from("tok")),
                &destination,
            )
            .await
            .unwrap();

        assert_eq!(written, 5);
        assert_eq!(
            std::fs::read(&destination).unwrap(),
            vec![0u8, 159, 146, 150, 10]
        );
        redirect.assert_async().await;
        storage.assert_async().await;
    }

    #[tokio::test]
    async fn test_download_failure_status_is_api_error() {
        let mut server = mockito::Server::new_async().await;
        let client = client_for(&server);
        let temp_dir = TempDir::new().unwrap();

        let _mock = server
            .mock("GET", "/artifacts/gone.txt")
            .with_status(410)
            .with_body("expired")
            .create_async()
            .await;

        let destination = temp_dir.path().join("gone.txt");
        let err = client
            .download(
                &format!("{}/artifacts/gone.txt", server.url()),
                None,
                &destination,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, CircleCiError::Api { status: 410, .. }));
        assert!(!destination.exists());
    }
}
