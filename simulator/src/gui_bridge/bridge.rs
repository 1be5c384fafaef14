use crate::gui_bridge::model::SessionView;
use log::{info, warn};
use std::{
    net::SocketAddr,
    sync::{Arc, RwLock},
    thread,
};
use tokio::runtime::Builder;
use warp::Filter;

pub fn gui_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

/// Holds the latest session view and serves it to a host UI over HTTP.
pub struct GuiBridge {
    state: Arc<RwLock<SessionView>>,
}

impl GuiBridge {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(SessionView::default())),
        }
    }

    /// Starts `GET /session` on a background thread.
    pub fn serve(&self, address: SocketAddr) {
        let state = self.state.clone();
        let state_filter = warp::any().map(move || state.clone());

        let session_route = warp::path("session")
            .and(warp::get())
            .and(state_filter)
            .map(|state: Arc<RwLock<SessionView>>| {
                let view = match state.read() {
                    Ok(view) => view.clone(),
                    Err(poisoned) => poisoned.into_inner().clone(),
                };
                warp::reply::json(&view)
            });

        thread::spawn(move || {
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    warn!("[GUI] failed to build bridge runtime: {}", err);
                    return;
                }
            };
            runtime.block_on(async move {
                warp::serve(session_route).run(address).await;
            });
        });
        info!("[GUI] serving session view on http://{}/session", address);
    }

    pub fn publish(&self, view: &SessionView) {
        let mut guard = match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = view.clone();
        info!(
            "[GUI] placements: {}, recents: {}, selected for deletion: {:?}",
            guard.placements.len(),
            guard.recents.len(),
            guard.selected_for_deletion
        );
    }

    pub fn publish_status(&self, message: &str) {
        println!("[GUI] {}", message);
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> SessionView {
        self.state.read().unwrap().clone()
    }
}

impl Default for GuiBridge {
    fn default() -> Self {
        Self::new()
    }
}
