pub mod refresh {
    pub mod index;
}
pub mod list {
    pub mod index;
}
pub mod read_by_name {
    pub mod index;
}
pub mod status_info {
    pub mod index;
}
pub mod image {
    pub mod index;
}
