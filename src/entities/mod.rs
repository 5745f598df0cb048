pub mod booking;
pub mod catalog_product;
pub mod customer;
pub mod order;
pub mod order_line_item;

pub use booking::Entity as Booking;
pub use catalog_product::Entity as CatalogProduct;
pub use customer::Entity as Customer;
pub use order::Entity as Order;
pub use order_line_item::Entity as OrderLineItem;

pub use booking::Model as BookingModel;
pub use catalog_product::Model as CatalogProductModel;
pub use customer::Model as CustomerModel;
pub use order::Model as OrderModel;
pub use order_line_item::Model as OrderLineItemModel;
