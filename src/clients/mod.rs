pub mod auth_client;
pub mod catalog_client;
pub mod shipping_client;

pub use auth_client::AuthClient;
pub use catalog_client::CatalogClient;
pub use shipping_client::{CreateLabelsRequest, ShippingApi, ShippingClient};
