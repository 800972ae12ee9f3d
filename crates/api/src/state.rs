use std::sync::Arc;

use ticketgate_core::error::CoreError;
use ticketgate_core::qr_codec::QrCodec;
use ticketgate_core::scanning::TicketScanner;
use ticketgate_db::ticket_store::PgTicketStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: ticketgate_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Seals payloads at issuance.
    pub qr_codec: Arc<QrCodec>,
    /// Validates scans against the Postgres ticket store.
    pub scanner: TicketScanner,
}

impl AppState {
    /// Wire the codec and scanner from `config`.
    ///
    /// Fails if the configured QR secret is too short.
    pub fn new(pool: ticketgate_db::DbPool, config: ServerConfig) -> Result<Self, CoreError> {
        let qr_codec = Arc::new(QrCodec::new(&config.qr.signing_secret)?);
        let store = Arc::new(PgTicketStore::new(pool.clone()));
        let scanner = TicketScanner::new(store, Arc::clone(&qr_codec), config.qr.already_used_policy);

        Ok(Self {
            pool,
            config: Arc::new(config),
            qr_codec,
            scanner,
        })
    }
}
