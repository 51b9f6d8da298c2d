use crate::item::{Pose, Tank};
use crate::sprite::Sprite;
use crate::xml::{format_number, XmlElement};
use rand::Rng;

/// Distance from the tank walls at which fish turn around, in pixels.
pub const EDGE_BUFFER: f64 = 10.0;

// Speed drawn for every new fish before its species picks its own range.
const MIN_SPEED_X: f64 = 20.0;
const MAX_SPEED_X: f64 = 50.0;

const WIGGLE_AMPLITUDE: f64 = 10.0;
const WIGGLE_SCALE: f64 = 0.01;

const BETA_REVERSE_PERCENT: u32 = 5;
const CARP_ZIGZAG_FREQUENCY: f64 = 2.0;
const CATFISH_DART_PERCENT: u32 = 3;
const CATFISH_DART_SECONDS: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DartState {
    Cruising,
    Darting { remaining: f64 },
}

/// Movement policy applied before the shared swim step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Species {
    Beta,
    Carp { zigzag_time: f64 },
    Catfish { dart: DartState },
}

impl Species {
    pub fn beta() -> Self {
        Species::Beta
    }

    pub fn carp() -> Self {
        Species::Carp { zigzag_time: 0.0 }
    }

    pub fn catfish() -> Self {
        Species::Catfish {
            dart: DartState::Cruising,
        }
    }

    /// Range both speed components are drawn from at creation.
    pub fn speed_range(&self) -> (f64, f64) {
        match self {
            Species::Beta => (50.0, 75.0),
            Species::Carp { .. } => (70.0, 190.0),
            Species::Catfish { .. } => (20.0, 35.0),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Fish {
    speed_x: f64,
    speed_y: f64,
    species: Species,
}

impl Fish {
    pub fn new<R: Rng + ?Sized>(species: Species, rng: &mut R) -> Self {
        let mut fish = Self {
            speed_x: uniform(rng, MIN_SPEED_X, MAX_SPEED_X),
            speed_y: 0.0,
            species,
        };
        let (min, max) = species.speed_range();
        fish.set_random_speed(min, max, rng);
        fish
    }

    pub fn species(&self) -> &Species {
        &self.species
    }

    pub fn speed_x(&self) -> f64 {
        self.speed_x
    }

    pub fn speed_y(&self) -> f64 {
        self.speed_y
    }

    pub fn set_speed_x(&mut self, v: f64) {
        self.speed_x = v;
    }

    pub fn set_speed_y(&mut self, v: f64) {
        self.speed_y = v;
    }

    /// Redraws both components from `[min, max)` with the shared generator.
    pub fn set_random_speed<R: Rng + ?Sized>(&mut self, min: f64, max: f64, rng: &mut R) {
        self.speed_x = uniform(rng, min, max);
        self.speed_y = uniform(rng, min, max);
    }

    pub(crate) fn update(&mut self, elapsed: f64, pose: &mut Pose, image: &Sprite, tank: &mut Tank) {
        let half_h = image.height() / 2.0;

        match &mut self.species {
            Species::Beta => {
                if tank.rng.gen_range(0..100) < BETA_REVERSE_PERCENT {
                    self.speed_x = -self.speed_x;
                }
                if pose.y - half_h < EDGE_BUFFER {
                    self.speed_y = self.speed_y.abs();
                } else if pose.y + half_h > tank.height - EDGE_BUFFER {
                    self.speed_y = -self.speed_y.abs();
                }
                // The swim step below moves the fish again this frame.
                pose.x += self.speed_x * elapsed;
                pose.y += self.speed_y * elapsed;
                pose.mirror = self.speed_x < 0.0;
            }
            Species::Carp { zigzag_time } => {
                *zigzag_time += elapsed;
                let amplitude = image.height();
                let y = pose.y + amplitude * (*zigzag_time * CARP_ZIGZAG_FREQUENCY).sin() * elapsed;
                pose.y = clamp_to_water(y, half_h, tank.height);
            }
            Species::Catfish { dart } => {
                if *dart == DartState::Cruising
                    && tank.rng.gen_range(0..100) < CATFISH_DART_PERCENT
                {
                    *dart = DartState::Darting {
                        remaining: CATFISH_DART_SECONDS,
                    };
                    self.speed_x *= 2.0;
                }
                if let DartState::Darting { remaining } = *dart {
                    let remaining = remaining - elapsed;
                    *dart = if remaining <= 0.0 {
                        self.speed_x /= 2.0;
                        DartState::Cruising
                    } else {
                        DartState::Darting { remaining }
                    };
                }

                if pose.y - half_h < EDGE_BUFFER {
                    self.speed_y = self.speed_y.abs();
                } else if pose.y + half_h > tank.height - EDGE_BUFFER {
                    self.speed_y = -self.speed_y.abs();
                }
                pose.y = clamp_to_water(pose.y, half_h, tank.height);
            }
        }

        self.swim(elapsed, pose, image, tank);
    }

    /// Shared step: bounce off the side walls, position-driven wiggle, move.
    fn swim(&mut self, elapsed: f64, pose: &mut Pose, image: &Sprite, tank: &Tank) {
        let half_w = image.width() / 2.0;
        let half_h = image.height() / 2.0;

        if pose.x - half_w < EDGE_BUFFER {
            self.speed_x = self.speed_x.abs();
        } else if pose.x + half_w > tank.width - EDGE_BUFFER {
            self.speed_x = -self.speed_x.abs();
        }

        self.speed_y = WIGGLE_AMPLITUDE * (pose.x * WIGGLE_SCALE).sin();
        if pose.y - half_h < EDGE_BUFFER || pose.y + half_h > tank.height - EDGE_BUFFER {
            self.speed_y = -self.speed_y;
        }

        pose.x += self.speed_x * elapsed;
        pose.y += self.speed_y * elapsed;
        pose.mirror = self.speed_x < 0.0;
    }

    pub(crate) fn xml_save(&self, node: &mut XmlElement) {
        node.set_attribute("speedx", format_number(self.speed_x));
        node.set_attribute("speedy", format_number(self.speed_y));
    }

    pub(crate) fn xml_load(&mut self, node: &XmlElement) {
        self.speed_x = node.number("speedx");
        self.speed_y = node.number("speedy");
    }
}

fn clamp_to_water(y: f64, half_h: f64, height: f64) -> f64 {
    if y - half_h < EDGE_BUFFER {
        EDGE_BUFFER + half_h
    } else if y + half_h > height - EDGE_BUFFER {
        height - half_h - EDGE_BUFFER
    } else {
        y
    }
}

fn uniform<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}
