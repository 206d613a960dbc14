pub mod bootstrap;
pub mod router;
pub mod rpc;
pub mod server;

pub use bootstrap::{App, DaemonError, bootstrap};
pub use router::Router;
pub use rpc::{Request, Response, RpcError};
pub use server::{Client, Server, ShutdownHandle, default_socket_path};
