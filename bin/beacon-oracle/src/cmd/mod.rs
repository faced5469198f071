pub mod deployments;
pub mod header_root;
pub mod run;
pub mod status;
