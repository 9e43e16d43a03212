use async_trait::async_trait;
use futures::StreamExt;
use syncwatch_core::error::FeedError;
use syncwatch_core::feed::{FeedConnection, StateFeed};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

/// State feed over a WebSocket; one text frame per authoritative change.
#[derive(Debug, Clone)]
pub struct WebSocketFeed {
    url: Url,
}

impl WebSocketFeed {
    pub fn new(url: Url) -> Self {
        Self { url }
    }
}

#[async_trait]
impl StateFeed for WebSocketFeed {
    fn endpoint(&self) -> String {
        self.url.to_string()
    }

    async fn connect(&self) -> Result<Box<dyn FeedConnection>, FeedError> {
        let (stream, response) =
            connect_async(self.url.as_str())
                .await
                .map_err(|err| FeedError::Connect {
                    endpoint: self.endpoint(),
                    source: Box::new(err),
                })?;
        log::debug!(
            "State feed handshake with {} answered {}",
            self.url,
            response.status()
        );
        Ok(Box::new(WebSocketConnection { stream }))
    }
}

struct WebSocketConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl FeedConnection for WebSocketConnection {
    async fn next_frame(&mut self) -> Option<Result<String, FeedError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => {
                    return Some(Ok(text.as_str().to_owned()));
                }
                Ok(Message::Close(frame)) => {
                    log::info!("State feed closed by controller: {:?}", frame);
                    return None;
                }
                Ok(Message::Binary(bytes)) => {
                    log::warn!(
                        "Ignoring {} byte binary frame on state feed",
                        bytes.len()
                    );
                }
                // Pings are answered by tungstenite on the next read.
                Ok(_) => {}
                Err(err) => {
                    return Some(Err(FeedError::Transport(Box::new(err))));
                }
            }
        }
    }
}
