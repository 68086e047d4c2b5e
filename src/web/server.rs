use std::net::SocketAddr;
use std::sync::Arc;
use tiny_http::{Header, Request, Response, Server, StatusCode};
use tracing::{error, info, warn};

use crate::{
    models::{HallOfFameError, Result},
    web::routes::{Reply, Router},
};

/// Blocking HTTP front end. `run` serves requests one at a time until a
/// [`ShutdownHandle`] unblocks it.
pub struct WebServer {
    http: Arc<Server>,
    router: Router,
}

/// Stops a running [`WebServer`] from another thread.
#[derive(Clone)]
pub struct ShutdownHandle {
    http: Arc<Server>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.http.unblock();
    }
}

impl WebServer {
    pub fn bind(addr: &str, router: Router) -> Result<Self> {
        let http = Server::http(addr)
            .map_err(|e| HallOfFameError::ServerError(format!("Failed to bind {}: {}", addr, e)))?;
        Ok(Self {
            http: Arc::new(http),
            router,
        })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.http.server_addr().to_ip()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            http: Arc::clone(&self.http),
        }
    }

    pub fn run(self) {
        if let Some(addr) = self.local_addr() {
            info!("Serving on http://{}", addr);
        }

        for request in self.http.incoming_requests() {
            let method = request.method().to_string();
            let url = request.url().to_string();
            let reply = self.router.handle(&method, &url);
            let status = reply.status;

            if let Err(e) = respond(request, reply) {
                warn!("Failed to send response for {} {}: {}", method, url, e);
                continue;
            }
            info!("{} {} {}", method, url, status);
        }

        info!("Server stopped");
    }
}

fn header(name: &str, value: &str) -> Result<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes())
        .map_err(|_| HallOfFameError::ServerError(format!("Invalid header {}: {}", name, value)))
}

fn respond(request: Request, reply: Reply) -> Result<()> {
    let mut response = Response::from_data(reply.body.into_bytes())
        .with_status_code(StatusCode(reply.status))
        .with_header(header("Content-Type", reply.content_type)?);

    if let Some(location) = &reply.location {
        match header("Location", location) {
            Ok(h) => response.add_header(h),
            Err(e) => error!("{}", e),
        }
    }

    request.respond(response)?;
    Ok(())
}
