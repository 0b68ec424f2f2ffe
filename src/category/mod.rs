//! Categories group transactions into income and expense kinds.

mod create;
mod db;
mod delete;
mod domain;
mod list;

pub use create::create_category_endpoint;
pub use db::{
    category_name_exists, count_categories, create_category, create_category_table,
    delete_category, find_category, get_all_categories, get_category,
};
pub(crate) use db::insert_category;
pub use delete::delete_category_endpoint;
pub use domain::{Category, CategoryId, CategoryName, MAX_CATEGORY_NAME_LENGTH};
pub use list::{list_categories, list_categories_endpoint};
