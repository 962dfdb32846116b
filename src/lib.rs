pub mod config;
pub mod device_client;
pub mod format;
pub mod http_client;
pub mod logging;
pub mod mock_server;
pub mod model;
pub mod reload;
pub mod session;
