//! Falling confetti for the celebration screen.
//!
//! Purely decorative: nothing here reads or writes stage state. Surface units
//! are pixel-like; the renderer decides how they map onto its cells.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const PARTICLE_COUNT: usize = 150;

/// Where a particle re-enters after falling off the bottom.
pub const WRAP_Y: f64 = -20.0;

/// Pink, hot pink, orchid, medium orchid, medium purple, sky blue.
pub const PALETTE: [(u8, u8, u8); 6] = [
    (0xFF, 0xC0, 0xCB),
    (0xFF, 0x69, 0xB4),
    (0xDA, 0x70, 0xD6),
    (0xBA, 0x55, 0xD3),
    (0x93, 0x70, 0xDB),
    (0x87, 0xCE, 0xEB),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub speed: f64,
    /// Degrees, kept in `[0, 360)`.
    pub angle: f64,
    /// Degrees per frame.
    pub spin: f64,
    pub color: (u8, u8, u8),
}

impl Particle {
    fn random<R: Rng>(rng: &mut R, width: f64, height: f64) -> Self {
        Self {
            x: rng.random_range(0.0..width.max(1.0)),
            y: rng.random_range(-height.max(1.0)..0.0),
            size: rng.random_range(4.0..12.0),
            speed: rng.random_range(2.0..5.0),
            angle: rng.random_range(0.0..360.0),
            spin: rng.random_range(-5.0..5.0),
            color: PALETTE[rng.random_range(0..PALETTE.len())],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Confetti {
    particles: Vec<Particle>,
    width: f64,
    height: f64,
}

impl Confetti {
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_rng(width, height, &mut StdRng::from_os_rng())
    }

    pub fn with_rng<R: Rng>(width: f64, height: f64, rng: &mut R) -> Self {
        let particles = (0..PARTICLE_COUNT)
            .map(|_| Particle::random(rng, width, height))
            .collect();
        Self {
            particles,
            width,
            height,
        }
    }

    /// Advance one animation frame.
    pub fn tick(&mut self) {
        for p in &mut self.particles {
            p.y += p.speed;
            p.angle = (p.angle + p.spin).rem_euclid(360.0);
            if p.y > self.height {
                p.y = WRAP_Y;
            }
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }
}

/// Confetti bound to the lifetime of the view that shows it.
///
/// Frames only advance between `start` and `stop`; a stopped loop holds no
/// particles.
#[derive(Debug, Default)]
pub struct ConfettiLoop {
    confetti: Option<Confetti>,
}

impl ConfettiLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start animating on a surface of the given size. Restarting a running
    /// loop only resizes it.
    pub fn start(&mut self, width: f64, height: f64) {
        match self.confetti.as_mut() {
            Some(confetti) => confetti.resize(width, height),
            None => {
                tracing::debug!(width, height, "confetti started");
                self.confetti = Some(Confetti::new(width, height));
            }
        }
    }

    pub fn stop(&mut self) {
        if self.confetti.take().is_some() {
            tracing::debug!("confetti stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.confetti.is_some()
    }

    pub fn tick(&mut self) {
        if let Some(confetti) = self.confetti.as_mut() {
            confetti.tick();
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        if let Some(confetti) = self.confetti.as_mut() {
            confetti.resize(width, height);
        }
    }

    pub fn confetti(&self) -> Option<&Confetti> {
        self.confetti.as_ref()
    }
}
