//! Extension pour lire les réglages de platinecontrol depuis platineconfig

use crate::convergence::ConvergencePolicy;
use crate::disk::DiskGeometry;
use crate::errors::Result;
use crate::rfid::RfidClient;
use crate::store::StoreOptions;
use platineconfig::Config;
use std::time::Duration;
use tracing::warn;

/// Réglages du lecteur RFID
#[derive(Debug, Clone, PartialEq)]
pub struct RfidSettings {
    pub base_url: String,
    pub poll_interval: Duration,
}

pub trait ControlConfigExt {
    /// Options du store depuis `player.*`
    fn store_options(&self) -> StoreOptions;

    /// Réglages RFID, `None` si le lecteur est désactivé ou sans URL
    fn rfid_settings(&self) -> Option<RfidSettings>;

    /// Client RFID prêt à l'emploi, `None` si le lecteur est désactivé
    fn rfid_client(&self) -> Result<Option<(RfidClient, Duration)>>;

    /// Géométrie du disque depuis `disk.*`
    fn disk_geometry(&self) -> DiskGeometry;
}

impl ControlConfigExt for Config {
    fn store_options(&self) -> StoreOptions {
        StoreOptions {
            poll_interval: Duration::from_millis(self.get_poll_interval_ms().max(1)),
            convergence: ConvergencePolicy {
                interval: Duration::from_millis(self.get_convergence_interval_ms().max(1)),
                max_attempts: self.get_convergence_max_attempts().min(u32::MAX as u64) as u32,
            },
            ignore_zero_volume: self.get_ignore_zero_volume(),
        }
    }

    fn rfid_settings(&self) -> Option<RfidSettings> {
        if !self.get_rfid_enabled() {
            return None;
        }

        let base_url = self.get_rfid_base_url().trim().to_string();
        if base_url.is_empty() {
            warn!("RFID reader enabled but rfid.base_url is empty");
            return None;
        }

        Some(RfidSettings {
            base_url,
            poll_interval: Duration::from_millis(self.get_rfid_poll_interval_ms().max(1)),
        })
    }

    fn rfid_client(&self) -> Result<Option<(RfidClient, Duration)>> {
        match self.rfid_settings() {
            Some(settings) => {
                let client = RfidClient::new(&settings.base_url)?;
                Ok(Some((client, settings.poll_interval)))
            }
            None => Ok(None),
        }
    }

    fn disk_geometry(&self) -> DiskGeometry {
        DiskGeometry::new(self.get_disk_diameter())
            .with_label_radius_ratio(self.get_label_radius_ratio())
    }
}
