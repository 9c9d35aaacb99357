pub mod attach_image;
pub mod create_buyer;
pub mod create_product;
pub mod create_seller;
pub mod delete_product;
pub mod landing;
pub mod list_products;
pub mod my_products;
pub mod update_product;
pub mod verification;
