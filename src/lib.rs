// Library for the binary and tests

pub mod aggregator;
pub mod cli;
pub mod collectors;
pub mod config;
pub mod docker_repo;
pub mod error;
pub mod kube_repo;
pub mod models;
pub mod printer;
pub mod report;
pub mod routes;
pub mod scheduler;
pub mod sysinfo_repo;
