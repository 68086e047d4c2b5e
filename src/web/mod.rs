pub mod pages;
pub mod routes;
pub mod server;

pub use routes::{Reply, Route, Router};
pub use server::{ShutdownHandle, WebServer};
