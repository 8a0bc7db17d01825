//! The prank button field shown on the welcome screen.
//!
//! A handful of buttons float around the screen. Exactly one of them starts
//! the surprise; pressing any other sends the whole field jumping to new
//! spots.

use rand::Rng;

/// Buttons in a freshly generated field.
pub const DECOY_COUNT: usize = 15;

/// Buttons are kept this far (in percent) from every edge.
pub const MIN_COORD: f64 = 10.0;
pub const MAX_COORD: f64 = 90.0;

pub const DECOY_LABEL: &str = "Click Me!";
pub const REAL_LABEL: &str = "Start Surprises";

/// A single floating button. Coordinates are percentages of the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoyButton {
    pub x: f64,
    pub y: f64,
    pub is_real: bool,
    pub scale: f64,
    /// Degrees.
    pub rotation: f64,
}

impl DecoyButton {
    pub fn label(&self) -> &'static str {
        if self.is_real {
            REAL_LABEL
        } else {
            DECOY_LABEL
        }
    }
}

/// Result of pressing a button in the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Press {
    Real,
    Decoy,
    /// No button at that index.
    Missed,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecoyField {
    buttons: Vec<DecoyButton>,
}

impl DecoyField {
    /// Lay out a new field with exactly one real button.
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let mut buttons: Vec<DecoyButton> = (0..DECOY_COUNT)
            .map(|_| DecoyButton {
                x: random_coord(rng),
                y: random_coord(rng),
                is_real: false,
                scale: rng.random_range(0.8..1.2),
                rotation: rng.random_range(-20.0..20.0),
            })
            .collect();

        let real = rng.random_range(0..buttons.len());
        buttons[real].is_real = true;

        Self { buttons }
    }

    /// Move every button somewhere else. Which button is real does not change.
    pub fn reshuffle<R: Rng>(&mut self, rng: &mut R) {
        for button in &mut self.buttons {
            let (old_x, old_y) = (button.x, button.y);
            loop {
                button.x = random_coord(rng);
                button.y = random_coord(rng);
                if button.x != old_x || button.y != old_y {
                    break;
                }
            }
            button.rotation = rng.random_range(0.0..360.0);
        }
    }

    pub fn press(&self, index: usize) -> Press {
        match self.buttons.get(index) {
            Some(button) if button.is_real => Press::Real,
            Some(_) => Press::Decoy,
            None => Press::Missed,
        }
    }

    pub fn clear(&mut self) {
        self.buttons.clear();
    }

    pub fn buttons(&self) -> &[DecoyButton] {
        &self.buttons
    }

    pub fn len(&self) -> usize {
        self.buttons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }

    pub fn real_index(&self) -> Option<usize> {
        self.buttons.iter().position(|b| b.is_real)
    }
}

fn random_coord<R: Rng>(rng: &mut R) -> f64 {
    rng.random_range(MIN_COORD..=MAX_COORD)
}
