//! Color and id generation
//!
//! Both generators are seeded `Pcg32`s, so a fixed seed gives a reproducible
//! sequence in tests and `platform::entropy_seed()` gives a fresh one per page load.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Soft card backgrounds
pub const PASTELS: [&str; 7] = [
    "#e1f5fe", "#c8e6c9", "#fff9c4", "#f8bbd0", "#bbdefb", "#ffecb3", "#d1c4e9",
];

/// Where colors are drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ColorScheme {
    /// Random saturated `hsl(...)` values
    #[default]
    Vivid,
    /// One of [`PASTELS`]
    Pastel,
}

impl ColorScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorScheme::Vivid => "Vivid",
            ColorScheme::Pastel => "Pastel",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "vivid" | "hsl" => Some(ColorScheme::Vivid),
            "pastel" => Some(ColorScheme::Pastel),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColorGenerator {
    rng: Pcg32,
    scheme: ColorScheme,
}

impl ColorGenerator {
    pub fn new(seed: u64, scheme: ColorScheme) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            scheme,
        }
    }

    pub fn next_color(&mut self) -> String {
        match self.scheme {
            ColorScheme::Vivid => self.random_hsl(),
            ColorScheme::Pastel => self.pastel().to_string(),
        }
    }

    /// Next color that differs from `previous`
    pub fn next_color_unlike(&mut self, previous: &str) -> String {
        loop {
            let color = self.next_color();
            if color != previous {
                return color;
            }
        }
    }

    /// `hsl(H, S%, L%)` with a bright, readable saturation/lightness band
    pub fn random_hsl(&mut self) -> String {
        let hue = self.rng.random_range(0..360);
        let saturation = self.rng.random_range(60..=90);
        let lightness = self.rng.random_range(45..=70);
        format!("hsl({}, {}%, {}%)", hue, saturation, lightness)
    }

    pub fn pastel(&mut self) -> &'static str {
        PASTELS[self.rng.random_range(0..PASTELS.len())]
    }
}

/// Opaque unique ids: `prefix-<random>-<sequence>`
#[derive(Debug, Clone)]
pub struct IdGenerator {
    rng: Pcg32,
    prefix: String,
    issued: u64,
}

impl IdGenerator {
    pub fn new(seed: u64, prefix: impl Into<String>) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            prefix: prefix.into(),
            issued: 0,
        }
    }

    pub fn next_id(&mut self) -> String {
        let noise: u64 = self.rng.random::<u64>() & 0xffff_ffff_ffff;
        let id = format!("{}-{:012x}-{}", self.prefix, noise, self.issued);
        self.issued += 1;
        id
    }

    /// Next id for which `taken` is false (guards against ids restored from storage)
    pub fn fresh_id(&mut self, taken: impl Fn(&str) -> bool) -> String {
        loop {
            let id = self.next_id();
            if !taken(&id) {
                return id;
            }
            log::debug!("Generated id `{}` already in use, retrying", id);
        }
    }
}
