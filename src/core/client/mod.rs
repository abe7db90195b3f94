pub mod api_client;
pub mod http_api_client;
pub mod workload_token;
