// Ambient globe scene: rotation, orthographic projection, ripples and stars.
// Pure math so the canvas view only has to draw what this hands back.

use crate::model::CountryDot;

const ROTATION_RAD_PER_S: f64 = 0.05;
const RIPPLE_GROWTH_PER_S: f64 = 0.4;
const RIPPLE_FADE_PER_S: f64 = 0.2;
const RIPPLE_START_OPACITY: f64 = 0.6;
const STAR_COUNT: usize = 220;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ripple {
    pub scale: f64,
    pub opacity: f64,
}

impl Default for Ripple {
    fn default() -> Self {
        Self {
            scale: 1.0,
            opacity: RIPPLE_START_OPACITY,
        }
    }
}

impl Ripple {
    fn advance(&mut self, dt: f64) {
        self.scale += dt * RIPPLE_GROWTH_PER_S;
        self.opacity -= dt * RIPPLE_FADE_PER_S;
        if self.opacity <= 0.0 {
            *self = Ripple::default();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    phase: f64,
}

impl Star {
    pub fn alpha(&self, t: f64) -> f64 {
        0.5 + 0.5 * (t * 2.0 + self.phase).sin()
    }
}

/// A point projected onto the viewport, relative to the globe center in
/// units of the globe radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub x: f64,
    pub y: f64,
    /// >0 on the visible hemisphere.
    pub depth: f64,
}

#[derive(Debug, Clone)]
pub struct GlobeState {
    pub rotation: f64,
    pub tilt: f64,
    pub elapsed: f64,
    pub dots: Vec<CountryDot>,
    pub ripples: Vec<Ripple>,
    pub stars: Vec<Star>,
}

impl Default for GlobeState {
    fn default() -> Self {
        let mut state = Self {
            rotation: 0.0,
            tilt: 0.35,
            elapsed: 0.0,
            dots: Vec::new(),
            ripples: Vec::new(),
            stars: generate_stars(STAR_COUNT, 0x00B1_0E0A),
        };
        state.set_dots(fallback_dots());
        state
    }
}

impl GlobeState {
    /// Replace markers; an empty backend listing keeps the fallback set.
    pub fn set_dots(&mut self, dots: Vec<CountryDot>) {
        if dots.is_empty() {
            return;
        }
        self.ripples = dots
            .iter()
            .enumerate()
            .map(|(i, _)| Ripple {
                scale: 1.0 + (i as f64 * 0.37) % 1.0,
                opacity: RIPPLE_START_OPACITY,
            })
            .collect();
        self.dots = dots;
    }

    pub fn advance(&mut self, dt_s: f64) {
        let dt = dt_s.clamp(0.0, 0.25);
        self.elapsed += dt;
        self.rotation = (self.rotation + dt * ROTATION_RAD_PER_S) % std::f64::consts::TAU;
        for r in &mut self.ripples {
            r.advance(dt);
        }
    }

    pub fn project(&self, lat: f64, lon: f64) -> Projected {
        project(lat, lon, self.rotation, self.tilt)
    }
}

/// Orthographic projection of a lat/lon (degrees) on the unit sphere after
/// spinning by `rotation` around the polar axis and tilting toward the viewer.
pub fn project(lat: f64, lon: f64, rotation: f64, tilt: f64) -> Projected {
    let phi = lat.to_radians();
    let lambda = lon.to_radians() + rotation;
    let x = phi.cos() * lambda.sin();
    let y = phi.sin();
    let z = phi.cos() * lambda.cos();
    let (st, ct) = tilt.sin_cos();
    Projected {
        x,
        y: -(y * ct - z * st),
        depth: y * st + z * ct,
    }
}

/// Lat/lon grid polylines (every 30 degrees) for the wireframe.
pub fn graticule() -> Vec<Vec<(f64, f64)>> {
    let mut lines = Vec::new();
    for lat in (-60..=60).step_by(30) {
        lines.push((-180..=180).step_by(6).map(|lon| (lat as f64, lon as f64)).collect());
    }
    for lon in (-180..180).step_by(30) {
        lines.push((-90..=90).step_by(6).map(|lat| (lat as f64, lon as f64)).collect());
    }
    lines
}

/// Positions in 0..1 viewport space; same seed, same sky.
pub fn generate_stars(count: usize, seed: u64) -> Vec<Star> {
    let mut s = seed.max(1);
    let mut next = move || {
        s ^= s << 13;
        s ^= s >> 7;
        s ^= s << 17;
        (s >> 11) as f64 / (1u64 << 53) as f64
    };
    (0..count)
        .map(|i| Star {
            x: next(),
            y: next(),
            size: 0.4 + next() * 1.1,
            phase: i as f64 * 0.15,
        })
        .collect()
}

pub fn fallback_dots() -> Vec<CountryDot> {
    [
        ("NG", 9.082, 8.6753),
        ("US", 37.0902, -95.7129),
        ("IN", 20.5937, 78.9629),
        ("BR", -14.235, -51.9253),
    ]
    .into_iter()
    .map(|(code, lat, lon)| CountryDot {
        country_code: code.to_string(),
        lat,
        lon,
        count: 0,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn front_and_back_of_the_sphere() {
        let front = project(0.0, 0.0, 0.0, 0.0);
        assert!((front.depth - 1.0).abs() < 1e-9);
        assert!(front.x.abs() < 1e-9);
        let back = project(0.0, 180.0, 0.0, 0.0);
        assert!(back.depth < 0.0);
        let north = project(90.0, 0.0, 0.0, 0.0);
        assert!((north.y + 1.0).abs() < 1e-9);
    }

    #[test]
    fn projection_stays_on_unit_disc() {
        for lat in (-90..=90).step_by(15) {
            for lon in (-180..=180).step_by(20) {
                let p = project(lat as f64, lon as f64, 1.3, 0.35);
                assert!(p.x * p.x + p.y * p.y <= 1.0 + 1e-9);
            }
        }
    }

    #[test]
    fn ripple_resets_after_fading() {
        let mut r = Ripple::default();
        for _ in 0..40 {
            r.advance(0.1);
        }
        assert!(r.opacity > 0.0 && r.opacity <= RIPPLE_START_OPACITY);
    }

    #[test]
    fn stars_are_deterministic_and_in_viewport() {
        let a = generate_stars(50, 7);
        assert_eq!(a, generate_stars(50, 7));
        assert!(a.iter().all(|s| (0.0..1.0).contains(&s.x) && (0.0..1.0).contains(&s.y)));
    }

    #[test]
    fn empty_dot_listing_keeps_fallback() {
        let mut g = GlobeState::default();
        g.set_dots(Vec::new());
        assert_eq!(g.dots.len(), 4);
        assert_eq!(g.ripples.len(), 4);
        g.advance(10.0);
        assert!(g.rotation > 0.0);
    }
}
