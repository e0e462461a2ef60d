//! SIMRS visit source abstraction
//!
//! Hospital information systems differ per deployment; each supported
//! schema variant is a polymorphic implementation of one [`VisitSource`]
//! capability, selected at startup by configuration.

pub mod khanza;
pub mod medifirst;
pub(crate) mod rows;

pub use khanza::KhanzaVisitSource;
pub use medifirst::MedifirstVisitSource;

use crate::config::SimrsConfig;
use crate::domain::{
    Diagnosis, GarudaError, MedicationDispense, MedicationRequest, ObservationLab,
    ObservationRadiology, Procedure, Result, SourceError, Visit,
};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use secrecy::ExposeSecret;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use sqlx::MySqlPool;
use std::sync::Arc;

/// Read-only query capability over one hospital database.
#[async_trait]
pub trait VisitSource: Send + Sync {
    /// Closed visits whose period start falls inside the window.
    async fn fetch_visits_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Visit>, SourceError>;

    async fn fetch_diagnosis(&self, visit_id: &str) -> Result<Vec<Diagnosis>, SourceError>;

    async fn fetch_lab(&self, visit_id: &str) -> Result<Vec<ObservationLab>, SourceError>;

    async fn fetch_radiology(
        &self,
        visit_id: &str,
    ) -> Result<Vec<ObservationRadiology>, SourceError>;

    async fn fetch_medication_request(
        &self,
        visit_id: &str,
    ) -> Result<Vec<MedicationRequest>, SourceError>;

    async fn fetch_medication_dispense(
        &self,
        visit_id: &str,
    ) -> Result<Vec<MedicationDispense>, SourceError>;

    async fn fetch_procedure(&self, visit_id: &str) -> Result<Vec<Procedure>, SourceError>;
}

/// Create the configured schema-variant implementation.
///
/// # Errors
///
/// Returns an error if the vendor is not supported or the hospital
/// database cannot be reached.
pub async fn create_visit_source(config: &SimrsConfig) -> Result<Arc<dyn VisitSource>> {
    let vendor = config.vendor.to_lowercase();
    let pool = mysql_pool(config).await?;

    let source: Arc<dyn VisitSource> = match vendor.as_str() {
        "khanza" => Arc::new(KhanzaVisitSource::new(pool)),
        "medifirst" => Arc::new(MedifirstVisitSource::new(pool)),
        _ => {
            return Err(GarudaError::Configuration(format!(
                "Unsupported SIMRS vendor: {vendor}. Supported vendors: khanza, medifirst"
            )))
        }
    };

    Ok(source)
}

async fn mysql_pool(config: &SimrsConfig) -> Result<MySqlPool, SourceError> {
    let options = MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.username)
        .password(config.password.expose_secret().as_str())
        .database(&config.database);

    MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
        .map_err(|e| SourceError::ConnectionFailed(e.to_string()))
}
