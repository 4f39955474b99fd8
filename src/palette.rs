use rand::Rng;
use rand::rngs::ThreadRng;

/// Palettes a palette change picks from.
pub const PALETTE_NAMES: [&str; 14] = [
    "Red",
    "Green",
    "Blue",
    "Cyan",
    "Magenta",
    "Yellow Hot",
    "Spectrum",
    "Ice",
    "Fire",
    "Rainbow RGB",
    "Cyan Hot",
    "Orange Hot",
    "5_Ramps",
    "Gem",
];

/// Uniform random palette selection.
pub struct PalettePicker<R: Rng = ThreadRng> {
    rng: R,
}

impl Default for PalettePicker {
    fn default() -> Self {
        Self::new(rand::thread_rng())
    }
}

impl<R: Rng> PalettePicker<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn pick(&mut self) -> &'static str {
        PALETTE_NAMES[self.rng.gen_range(0..PALETTE_NAMES.len())]
    }
}

/// Display colour for a palette, used by the preview target.
pub fn palette_tint(name: &str) -> [u8; 3] {
    match name {
        "Red" => [255, 40, 40],
        "Green" => [40, 220, 40],
        "Blue" => [50, 90, 255],
        "Cyan" => [0, 220, 230],
        "Magenta" => [230, 0, 230],
        "Yellow Hot" => [255, 230, 80],
        "Spectrum" => [150, 80, 255],
        "Ice" => [150, 210, 255],
        "Fire" => [255, 110, 20],
        "Rainbow RGB" => [255, 160, 200],
        "Cyan Hot" => [120, 255, 255],
        "Orange Hot" => [255, 150, 40],
        "5_Ramps" => [200, 200, 120],
        "Gem" => [120, 255, 170],
        _ => [255, 255, 255],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn picks_known_palettes() {
        let mut picker = PalettePicker::new(StdRng::seed_from_u64(7));
        for _ in 0..100 {
            assert!(PALETTE_NAMES.contains(&picker.pick()));
        }
    }

    #[test]
    fn eventually_picks_more_than_one() {
        let mut picker = PalettePicker::new(StdRng::seed_from_u64(42));
        let first = picker.pick();
        assert!((0..200).any(|_| picker.pick() != first));
    }

    #[test]
    fn every_palette_has_a_tint() {
        for name in PALETTE_NAMES {
            assert_ne!(palette_tint(name), [255, 255, 255], "{name}");
        }
    }
}
