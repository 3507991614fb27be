pub mod summary_image;
