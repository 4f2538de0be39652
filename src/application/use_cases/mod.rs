pub mod plan;
pub mod renewal;
pub mod spend_stats;
pub mod subscription;
