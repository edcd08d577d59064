//! # pmoserver - Serveur web haut niveau basé sur Axum
//!
//! Cette crate fournit une abstraction simple pour créer le serveur HTTP de
//! PMO Now Playing et permettre aux autres crates d'y greffer leurs routes.
//!
//! ## Fonctionnalités
//!
//! - 🚀 **API de haut niveau** : routes JSON, handlers avec état, sous-routers
//! - 🌐 **CORS** : origines autorisées lues depuis la configuration
//! - 📡 **Logs en temps réel** : buffer circulaire exposé en SSE (`/log-sse`)
//! - ⚡ **Arrêt gracieux** : Ctrl+C propagé via un `CancellationToken`
//!
//! ## Architecture
//!
//! - [`server`] : le serveur et son builder
//! - [`logs`] : initialisation de `tracing` et routes de logs
//!
//! Les crates métier (`pmolive`, `pmospotify`) étendent [`Server`] par des
//! traits d'extension : `pmoserver` ne les connaît pas.
//!
//! ## Exemple d'utilisation
//!
//! ```rust,no_run
//! use pmoserver::ServerBuilder;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut server = ServerBuilder::new_configured().build();
//!     server.init_logging().await;
//!
//!     server.add_route("/", || async {
//!         serde_json::json!({"status": "ok"})
//!     }).await;
//!
//!     server.start().await?;
//!     server.wait().await;
//!     Ok(())
//! }
//! ```

pub mod logs;
pub mod server;

pub use logs::{LogState, SseLayer, log_dump, log_sse};
pub use server::{Server, ServerBuilder, ServerInfo};
