//! Test server for adapter tests
//!
//! Serves canned JSON answers through an axum router.

use axum::{
	http::{header, StatusCode},
	routing::get,
	Router,
};
use std::collections::HashMap;
use tokio::task::JoinHandle;

/// Canned `(status, body)` answers keyed by request path
pub type Routes = HashMap<&'static str, (u16, &'static str)>;

/// Test server instance, stopped on drop
pub struct TestServer {
	pub base_url: String,
	pub handle: JoinHandle<()>,
}

impl TestServer {
	/// Spawn a server answering GET requests from `routes`
	///
	/// Unknown paths get a 404.
	pub async fn spawn(routes: Routes) -> Self {
		let app = routes
			.into_iter()
			.fold(Router::new(), |router, (path, (status, body))| {
				let status = StatusCode::from_u16(status).expect("valid status code");
				router.route(
					path,
					get(move || async move {
						(status, [(header::CONTENT_TYPE, "application/json")], body)
					}),
				)
			});

		let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
			.await
			.expect("bind test listener");
		let addr = listener.local_addr().expect("test listener address");
		let handle = tokio::spawn(async move {
			if let Err(e) = axum::serve(listener, app).await {
				tracing::warn!("Test server stopped: {}", e);
			}
		});

		Self {
			base_url: format!("http://{addr}"),
			handle,
		}
	}
}

impl Drop for TestServer {
	fn drop(&mut self) {
		self.handle.abort();
	}
}
