pub mod gate;
pub mod policy;
pub mod role_client;
