pub mod feed;
pub mod gateway;
pub mod http_client;
mod json_pick;
pub mod livescore_fetch;
pub mod proxy;
pub mod state;
pub mod stats;
