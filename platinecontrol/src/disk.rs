//! Disposition des pistes d'un album sur un disque vinyle
//!
//! L'album est coupé en deux faces : la face A reçoit `ceil(n/2)` pistes, la
//! face B le reste. Sur chaque face les pistes sont réparties uniformément
//! autour d'un cercle, la première à 0° (midi), dans le sens horaire.

use platinespotify::Track;
use std::fmt;

/// Rayon des étiquettes, en fraction du diamètre du disque
pub const DEFAULT_LABEL_RADIUS_RATIO: f64 = 0.35;
pub const DEFAULT_DISK_DIAMETER: f64 = 400.0;

/// Zone cliquable d'une étiquette (centrée sur sa position)
pub const LABEL_WIDTH: f64 = 100.0;
pub const LABEL_HEIGHT: f64 = 50.0;
/// Tolérance autour de la zone cliquable
pub const HIT_SLOP: f64 = 10.0;

/// Fraction de la hauteur disponible occupée par le disque
const HEIGHT_FILL: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DiskSide {
    #[default]
    A,
    B,
}

impl DiskSide {
    pub fn flipped(self) -> Self {
        match self {
            DiskSide::A => DiskSide::B,
            DiskSide::B => DiskSide::A,
        }
    }
}

impl fmt::Display for DiskSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiskSide::A => write!(f, "A"),
            DiskSide::B => write!(f, "B"),
        }
    }
}

/// Nombre de pistes de la face A
pub fn side_a_len(track_count: usize) -> usize {
    track_count.div_ceil(2)
}

/// Pistes d'une face, dans l'ordre de l'album
pub fn side_of<T>(tracks: &[T], side: DiskSide) -> &[T] {
    let (a, b) = split_sides(tracks);
    match side {
        DiskSide::A => a,
        DiskSide::B => b,
    }
}

pub fn split_sides<T>(tracks: &[T]) -> (&[T], &[T]) {
    tracks.split_at(side_a_len(tracks.len()))
}

/// Face portant une piste (recherche par URI)
pub fn side_containing(tracks: &[Track], uri: &str) -> Option<DiskSide> {
    let index = tracks.iter().position(|track| track.uri == uri)?;
    if index < side_a_len(tracks.len()) {
        Some(DiskSide::A)
    } else {
        Some(DiskSide::B)
    }
}

/// Diamètre du disque pour une zone d'affichage donnée
pub fn disk_size(width: f64, height: f64) -> f64 {
    width.min(height * HEIGHT_FILL)
}

/// Emplacement d'une piste sur le disque
///
/// `x` et `y` sont relatifs au centre du disque, `y` vers le bas.
#[derive(Debug, Clone, PartialEq)]
pub struct Wedge<'a> {
    pub track: &'a Track,
    pub index: usize,
    pub angle_degrees: f64,
    pub x: f64,
    pub y: f64,
    /// Rotation inverse appliquée à l'étiquette pour qu'elle reste lisible
    pub label_rotation: f64,
    pub is_current: bool,
}

impl Wedge<'_> {
    /// La zone cliquable tourne avec la part du disque : le point est
    /// ramené dans le repère de l'étiquette avant le test.
    fn hit_distance(&self, x: f64, y: f64) -> Option<f64> {
        let dx = x - self.x;
        let dy = y - self.y;
        let (sin, cos) = self.angle_degrees.to_radians().sin_cos();
        let along = dx * cos + dy * sin;
        let across = dy * cos - dx * sin;
        let inside = along.abs() <= LABEL_WIDTH / 2.0 + HIT_SLOP
            && across.abs() <= LABEL_HEIGHT / 2.0 + HIT_SLOP;
        inside.then(|| dx.hypot(dy))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskGeometry {
    pub diameter: f64,
    pub label_radius_ratio: f64,
}

impl Default for DiskGeometry {
    fn default() -> Self {
        Self::new(DEFAULT_DISK_DIAMETER)
    }
}

impl DiskGeometry {
    pub fn new(diameter: f64) -> Self {
        Self {
            diameter,
            label_radius_ratio: DEFAULT_LABEL_RADIUS_RATIO,
        }
    }

    /// Géométrie ajustée à une zone d'affichage
    pub fn fit(width: f64, height: f64) -> Self {
        Self::new(disk_size(width, height))
    }

    pub fn with_label_radius_ratio(mut self, ratio: f64) -> Self {
        self.label_radius_ratio = ratio;
        self
    }

    pub fn label_radius(&self) -> f64 {
        self.diameter * self.label_radius_ratio
    }

    /// Place les pistes d'une face autour du disque
    ///
    /// La piste `i` sur `n` est à l'angle `i * 360 / n`. Une face vide donne
    /// une disposition vide.
    pub fn layout<'a>(&self, tracks: &'a [Track], current_uri: Option<&str>) -> Vec<Wedge<'a>> {
        let count = tracks.len();
        let radius = self.label_radius();

        tracks
            .iter()
            .enumerate()
            .map(|(index, track)| {
                let angle_degrees = index as f64 * 360.0 / count as f64;
                let radians = angle_degrees.to_radians();
                Wedge {
                    track,
                    index,
                    angle_degrees,
                    x: radius * radians.sin(),
                    y: -radius * radians.cos(),
                    label_rotation: -angle_degrees,
                    is_current: current_uri == Some(track.uri.as_str()),
                }
            })
            .collect()
    }

    /// Disposition d'une face d'un album complet
    pub fn layout_side<'a>(
        &self,
        album_tracks: &'a [Track],
        side: DiskSide,
        current_uri: Option<&str>,
    ) -> Vec<Wedge<'a>> {
        self.layout(side_of(album_tracks, side), current_uri)
    }
}

/// Étiquette sous le point `(x, y)` (relatif au centre du disque)
///
/// Chaque zone est un rectangle de 100 × 50 (plus la tolérance) centré sur
/// la part et tourné de son angle. Si plusieurs zones se recouvrent, la plus proche de son centre l'emporte.
pub fn wedge_at<'w, 'a>(wedges: &'w [Wedge<'a>], x: f64, y: f64) -> Option<&'w Wedge<'a>> {
    wedges
        .iter()
        .filter_map(|wedge| wedge.hit_distance(x, y).map(|distance| (wedge, distance)))
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(wedge, _)| wedge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tracks(uris: &[&str]) -> Vec<Track> {
        uris.iter()
            .map(|uri| serde_json::from_value(json!({ "uri": uri, "name": uri })).unwrap())
            .collect()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_side_split_sizes() {
        for n in 0..12usize {
            let items: Vec<usize> = (0..n).collect();
            let (a, b) = split_sides(&items);
            assert_eq!(a.len(), n.div_ceil(2));
            assert_eq!(a.len() + b.len(), n);
            assert!(a.len() >= b.len() && a.len() - b.len() <= 1);
            assert_eq!([a, b].concat(), items);
        }
    }

    #[test]
    fn test_three_track_album() {
        let album = tracks(&["1", "2", "3"]);
        let uris = |side| {
            side_of(&album, side)
                .iter()
                .map(|t| t.uri.as_str())
                .collect::<Vec<_>>()
        };
        assert_eq!(uris(DiskSide::A), vec!["1", "2"]);
        assert_eq!(uris(DiskSide::B), vec!["3"]);

        let geometry = DiskGeometry::default();
        let side_a = geometry.layout_side(&album, DiskSide::A, None);
        assert_eq!(side_a[0].angle_degrees, 0.0);
        assert_eq!(side_a[1].angle_degrees, 180.0);

        let side_b = geometry.layout_side(&album, DiskSide::B, None);
        assert_eq!(side_b.len(), 1);
        assert_eq!(side_b[0].angle_degrees, 0.0);

        assert_eq!(side_containing(&album, "3"), Some(DiskSide::B));
        assert_eq!(side_containing(&album, "9"), None);
    }

    #[test]
    fn test_uniform_spacing() {
        let album = tracks(&["a", "b", "c", "d", "e"]);
        let geometry = DiskGeometry::new(400.0);
        let wedges = geometry.layout(&album, Some("c"));

        for (i, wedge) in wedges.iter().enumerate() {
            assert!(approx(wedge.angle_degrees, i as f64 * 72.0));
            assert!(approx(wedge.x.hypot(wedge.y), 140.0));
            assert!(approx(wedge.label_rotation, -wedge.angle_degrees));
        }
        let current: Vec<_> = wedges.iter().filter(|w| w.is_current).collect();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].track.uri, "c");
    }

    #[test]
    fn test_clockwise_from_top() {
        let album = tracks(&["a", "b", "c", "d"]);
        let wedges = DiskGeometry::new(200.0).layout(&album, None);
        assert!(approx(wedges[0].x, 0.0) && approx(wedges[0].y, -70.0));
        assert!(approx(wedges[1].x, 70.0) && approx(wedges[1].y, 0.0));
        assert!(approx(wedges[2].x, 0.0) && approx(wedges[2].y, 70.0));
        assert!(approx(wedges[3].x, -70.0) && approx(wedges[3].y, 0.0));
    }

    #[test]
    fn test_empty_layout() {
        let album = tracks(&["only"]);
        assert!(DiskGeometry::default()
            .layout_side(&album, DiskSide::B, None)
            .is_empty());
    }

    #[test]
    fn test_disk_size() {
        assert_eq!(disk_size(300.0, 1000.0), 300.0);
        assert!(approx(disk_size(1000.0, 400.0), 380.0));
    }

    #[test]
    fn test_wedge_at() {
        let album = tracks(&["a", "b"]);
        let wedges = DiskGeometry::new(400.0).layout(&album, None);

        assert_eq!(wedge_at(&wedges, 0.0, -140.0).map(|w| w.index), Some(0));
        assert_eq!(wedge_at(&wedges, 20.0, 150.0).map(|w| w.index), Some(1));
        // Dans la tolérance
        assert_eq!(wedge_at(&wedges, 55.0, -140.0).map(|w| w.index), Some(0));
        assert_eq!(wedge_at(&wedges, 0.0, -140.0 - 34.0).map(|w| w.index), Some(0));
        assert!(wedge_at(&wedges, 0.0, 0.0).is_none());
        assert!(wedge_at(&wedges, 61.0, -140.0).is_none());
    }

    #[test]
    fn test_wedge_at_follows_wedge_rotation() {
        let album = tracks(&["a", "b", "c", "d"]);
        let wedges = DiskGeometry::new(400.0).layout(&album, None);
        assert!(approx(wedges[1].x, 140.0) && approx(wedges[1].y, 0.0));

        // À 90° la zone fait 50 de large et 100 de haut
        assert!(wedge_at(&wedges, 195.0, 0.0).is_none());
        assert_eq!(wedge_at(&wedges, 174.0, 0.0).map(|w| w.index), Some(1));
        assert_eq!(wedge_at(&wedges, 140.0, 50.0).map(|w| w.index), Some(1));
        assert_eq!(wedge_at(&wedges, 140.0, -59.0).map(|w| w.index), Some(1));
    }

    #[test]
    fn test_wedge_at_diagonal() {
        let album = tracks(&["a", "b", "c", "d", "e", "f", "g", "h"]);
        let wedges = DiskGeometry::new(400.0).layout(&album, None);
        let wedge = &wedges[1];
        assert_eq!(wedge.angle_degrees, 45.0);

        let (sin, cos) = 45f64.to_radians().sin_cos();
        // Le long de l'étiquette : dans la zone
        let (x, y) = (wedge.x + 55.0 * cos, wedge.y + 55.0 * sin);
        assert_eq!(wedge_at(&wedges, x, y).map(|w| w.index), Some(1));
        // En travers, au-delà de 25 + 10 : hors de toute zone
        let (x, y) = (wedge.x - 40.0 * sin, wedge.y + 40.0 * cos);
        assert!(wedge_at(&wedges, x, y).is_none());
        // En travers, dans la tolérance
        let (x, y) = (wedge.x - 30.0 * sin, wedge.y + 30.0 * cos);
        assert_eq!(wedge_at(&wedges, x, y).map(|w| w.index), Some(1));
    }

    #[test]
    fn test_side_flip() {
        assert_eq!(DiskSide::A.flipped(), DiskSide::B);
        assert_eq!(DiskSide::B.flipped().to_string(), "A");
    }
}
