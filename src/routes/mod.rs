mod admin;
mod categories;
mod health_check;
mod products;

pub use admin::{login, register};
pub use categories::{
    add_category, delete_category, get_category, list_categories, update_category, Category,
};
pub use health_check::health_check;
pub use products::{
    add_product, delete_product, get_product, search_products, update_product, Product,
};
