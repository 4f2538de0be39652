pub mod plan;
pub mod subscription;
