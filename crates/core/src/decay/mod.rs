use std::collections::HashMap;

/// Quantization factor applied to `map_x` before it is used as a cache key.
const KEY_SCALE: f32 = 1000.0;
/// Largest key produced by the sample domain `[-2, 2]`.
const DOMAIN_KEY_LIMIT: i32 = 2000;
const DOMAIN_SLOTS: usize = (DOMAIN_KEY_LIMIT as usize) * 2 + 1;

/// Memoized `4 / (4 + x^4)` edge attenuation.
///
/// Inputs are quantized by truncating `x * 1000` toward zero, so every sample
/// of the `[-2, 2]` domain lands in one of 4001 slots of a flat table. Keys
/// outside the domain are still memoized, in a side map. Values do not depend
/// on the surface width, so one cache serves the whole lifetime of a view.
#[derive(Debug, Clone)]
pub struct DecayCache {
    slots: Vec<Option<f64>>,
    overflow: HashMap<i32, f64>,
    computations: usize,
}

impl DecayCache {
    pub fn new() -> Self {
        Self {
            slots: vec![None; DOMAIN_SLOTS],
            overflow: HashMap::new(),
            computations: 0,
        }
    }

    /// Attenuation for `map_x`, computed once per quantized key.
    pub fn decay(&mut self, map_x: f32) -> f64 {
        let key = quantize(map_x);
        let slot = match domain_index(key) {
            Some(index) => &mut self.slots[index],
            None => {
                if let Some(value) = self.overflow.get(&key) {
                    return *value;
                }
                let value = decay_fn(map_x);
                self.computations += 1;
                self.overflow.insert(key, value);
                return value;
            }
        };

        match *slot {
            Some(value) => value,
            None => {
                let value = decay_fn(map_x);
                self.computations += 1;
                *slot = Some(value);
                value
            }
        }
    }

    /// Number of distinct keys evaluated so far.
    pub fn computations(&self) -> usize {
        self.computations
    }
}

impl Default for DecayCache {
    fn default() -> Self {
        Self::new()
    }
}

fn quantize(map_x: f32) -> i32 {
    (map_x * KEY_SCALE) as i32
}

fn domain_index(key: i32) -> Option<usize> {
    if (-DOMAIN_KEY_LIMIT..=DOMAIN_KEY_LIMIT).contains(&key) {
        Some((key + DOMAIN_KEY_LIMIT) as usize)
    } else {
        None
    }
}

fn decay_fn(map_x: f32) -> f64 {
    let x = map_x as f64;
    4.0 / (4.0 + x.powi(4))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memoizes_per_quantized_key() {
        let mut cache = DecayCache::new();
        let first = cache.decay(0.5);
        let second = cache.decay(0.5);
        assert_eq!(first, second);
        assert_eq!(cache.computations(), 1);

        // 0.5004 truncates to the same key as 0.5.
        assert_eq!(cache.decay(0.5004), first);
        assert_eq!(cache.computations(), 1);

        cache.decay(-0.5);
        assert_eq!(cache.computations(), 2);
    }

    #[test]
    fn matches_closed_form_on_domain() {
        let mut cache = DecayCache::new();
        assert_eq!(cache.decay(0.0), 1.0);
        assert!((cache.decay(2.0) - 0.2).abs() < 1e-12);
        assert!((cache.decay(-2.0) - 0.2).abs() < 1e-12);
        assert!((cache.decay(1.0) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn keys_outside_domain_are_memoized_too() {
        let mut cache = DecayCache::new();
        let value = cache.decay(3.0);
        assert!((value - 4.0 / 85.0).abs() < 1e-12);
        assert_eq!(cache.decay(3.0), value);
        assert_eq!(cache.computations(), 1);
    }

    #[test]
    fn full_domain_sweep_stays_within_slot_count() {
        let mut cache = DecayCache::new();
        for i in 0..=64 {
            let map_x = (i as f32 / 64.0) * 4.0 - 2.0;
            let value = cache.decay(map_x);
            assert!(value > 0.0 && value <= 1.0);
        }
        assert!(cache.computations() <= 65);
        assert!(cache.overflow.is_empty());
    }
}
