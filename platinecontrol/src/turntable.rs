//! État d'animation de la platine : rotation du disque et retournement

use crate::disk::DiskSide;
use std::time::Duration;

/// Durée d'un tour complet de disque
pub const REVOLUTION_PERIOD: Duration = Duration::from_millis(8000);

/// Durée de chaque moitié du retournement (0° à 90°, puis 270° à 360°)
pub const FLIP_HALF_DURATION: Duration = Duration::from_millis(250);

/// Rotation continue du disque pendant la lecture
///
/// L'angle avance tant que la lecture est en cours et reste figé en pause ;
/// il reprend de là où il s'était arrêté.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinState {
    angle: f64,
    spinning: bool,
    period: Duration,
}

impl Default for SpinState {
    fn default() -> Self {
        Self::new(REVOLUTION_PERIOD)
    }
}

impl SpinState {
    pub fn new(period: Duration) -> Self {
        Self {
            angle: 0.0,
            spinning: false,
            period,
        }
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.spinning = playing;
    }

    pub fn is_spinning(&self) -> bool {
        self.spinning
    }

    /// Angle courant en degrés, dans `[0, 360)`
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Fait avancer l'horloge d'animation et renvoie le nouvel angle
    pub fn advance(&mut self, elapsed: Duration) -> f64 {
        if self.spinning && !self.period.is_zero() {
            let turns = elapsed.as_secs_f64() / self.period.as_secs_f64();
            self.angle = (self.angle + turns * 360.0).rem_euclid(360.0);
        }
        self.angle
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlipPhase {
    Idle,
    /// Le disque tourne vers la tranche, face d'origine encore visible
    Closing,
    /// Face changée, le disque revient de face
    Opening,
}

/// Retournement du disque entre la face A et la face B
///
/// La face affichée change au milieu de l'animation (disque vu par la
/// tranche). Une demande pendant un retournement en cours est ignorée.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlipState {
    side: DiskSide,
    phase: FlipPhase,
}

impl Default for FlipState {
    fn default() -> Self {
        Self::new(DiskSide::A)
    }
}

impl FlipState {
    pub fn new(side: DiskSide) -> Self {
        Self {
            side,
            phase: FlipPhase::Idle,
        }
    }

    pub fn side(&self) -> DiskSide {
        self.side
    }

    pub fn is_flipping(&self) -> bool {
        self.phase != FlipPhase::Idle
    }

    /// Démarre un retournement ; `false` si un retournement est déjà en cours
    pub fn begin_flip(&mut self) -> bool {
        if self.is_flipping() {
            return false;
        }
        self.phase = FlipPhase::Closing;
        true
    }

    /// Point milieu : la face affichée bascule
    pub fn midpoint(&mut self) {
        if self.phase == FlipPhase::Closing {
            self.side = self.side.flipped();
            self.phase = FlipPhase::Opening;
        }
    }

    pub fn finish_flip(&mut self) {
        if self.phase == FlipPhase::Closing {
            self.midpoint();
        }
        self.phase = FlipPhase::Idle;
    }

    /// Pilote le retournement d'après le temps écoulé depuis `begin_flip`
    ///
    /// Renvoie la rotation autour de l'axe vertical, en degrés.
    pub fn update(&mut self, since_begin: Duration) -> f64 {
        if !self.is_flipping() {
            return 0.0;
        }

        let half = FLIP_HALF_DURATION.as_secs_f64();
        let t = since_begin.as_secs_f64();
        if t >= 2.0 * half {
            self.finish_flip();
            0.0
        } else if t >= half {
            self.midpoint();
            270.0 + 90.0 * (t - half) / half
        } else {
            90.0 * t / half
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spin_advances_only_while_playing() {
        let mut spin = SpinState::default();
        assert_eq!(spin.advance(Duration::from_secs(2)), 0.0);

        spin.set_playing(true);
        assert_eq!(spin.advance(Duration::from_secs(2)), 90.0);
        assert_eq!(spin.advance(Duration::from_secs(8)), 90.0);

        spin.set_playing(false);
        assert_eq!(spin.advance(Duration::from_secs(3)), 90.0);

        spin.set_playing(true);
        assert_eq!(spin.advance(Duration::from_secs(4)), 270.0);
    }

    #[test]
    fn test_flip_switches_side_at_midpoint() {
        let mut flip = FlipState::default();
        assert!(flip.begin_flip());
        assert_eq!(flip.side(), DiskSide::A);

        assert_eq!(flip.update(Duration::from_millis(125)), 45.0);
        assert_eq!(flip.side(), DiskSide::A);

        flip.update(Duration::from_millis(300));
        assert_eq!(flip.side(), DiskSide::B);
        assert!(flip.is_flipping());

        flip.update(Duration::from_millis(500));
        assert!(!flip.is_flipping());
        assert_eq!(flip.side(), DiskSide::B);
    }

    #[test]
    fn test_flip_ignored_while_in_progress() {
        let mut flip = FlipState::new(DiskSide::B);
        assert!(flip.begin_flip());
        assert!(!flip.begin_flip());
        flip.finish_flip();
        assert_eq!(flip.side(), DiskSide::A);
        assert!(flip.begin_flip());
    }
}
