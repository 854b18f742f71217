pub mod alerts;
pub mod exec;
pub mod health;
pub mod info;
pub mod redis;
pub mod usage;
