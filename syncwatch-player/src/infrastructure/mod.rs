pub mod api_client;
pub mod console;
pub mod ws_feed;

pub use api_client::HttpCommandChannel;
pub use ws_feed::WebSocketFeed;
