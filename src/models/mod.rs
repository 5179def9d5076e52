pub mod batch;
pub mod loaders;
pub mod order;
pub mod shipping;

pub use batch::{BatchRequest, PdfMode};
pub use loaders::{load_all_batch_files, load_batch_file};
pub use order::{Order, OrderStatus};
pub use shipping::{Courier, Guide, ShippingLabel, ShippingPackage};
