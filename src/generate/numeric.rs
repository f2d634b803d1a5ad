//! Numeric sample texts for sort-order batches.
//!
//! Every generator draws from its own seeded stream, so the same seed gives
//! the same texts regardless of what else is generated.

use rand::Rng;

use crate::config::seeded_rng;

const MAGNITUDE: u64 = 1_000_000_000;

/// Integer in (-1e9, 1e9); multiples of three are negated.
pub fn random_integer<R: Rng + ?Sized>(rng: &mut R) -> i64 {
    let x = (rng.gen::<u64>() % MAGNITUDE) as i64;
    if x % 3 == 0 {
        -x
    } else {
        x
    }
}

fn positive<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(0..i64::MAX) as f64 + 1.0
}

/// Plain integer texts.
pub fn integers(seed: u64, count: usize) -> Vec<String> {
    let mut rng = seeded_rng(seed);
    (0..count).map(|_| random_integer(&mut rng).to_string()).collect()
}

/// Decimals of magnitude at most one.
pub fn small_decimals(seed: u64, count: usize) -> Vec<String> {
    let mut rng = seeded_rng(seed);
    (0..count)
        .map(|_| {
            // Negated values are multiples of three, so x + 1 is never zero.
            let x = random_integer(&mut rng);
            (1.0 / (x + 1) as f64).to_string()
        })
        .collect()
}

/// Decimals of magnitude at least one.
pub fn large_decimals(seed: u64, count: usize) -> Vec<String> {
    let mut rng = seeded_rng(seed);
    (0..count)
        .map(|_| {
            let x = random_integer(&mut rng) as f64;
            let mut y = x / positive(&mut rng) + 1.0;
            if -1.0 < y && y < 1.0 {
                y += 2.0;
            }
            y.to_string()
        })
        .collect()
}

/// Floats in exponent notation.
pub fn floats(seed: u64, count: usize) -> Vec<String> {
    let mut rng = seeded_rng(seed);
    (0..count)
        .map(|_| {
            let x = random_integer(&mut rng) as f64;
            format!("{:e}", x / positive(&mut rng))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_integer_range() {
        let mut rng = seeded_rng(5);
        for _ in 0..1000 {
            let x = random_integer(&mut rng);
            assert!(x.unsigned_abs() < MAGNITUDE);
            if x < 0 {
                assert_eq!(x % 3, 0);
            }
        }
    }

    #[test]
    fn test_generators_are_deterministic() {
        assert_eq!(integers(9, 20), integers(9, 20));
        assert_eq!(floats(9, 20), floats(9, 20));
        assert_ne!(integers(9, 20), integers(10, 20));
    }

    #[test]
    fn test_decimal_magnitudes() {
        for text in small_decimals(1, 200) {
            let v: f64 = text.parse().unwrap();
            assert!(v.abs() <= 1.0, "{text}");
        }
        for text in large_decimals(1, 200) {
            let v: f64 = text.parse().unwrap();
            assert!(v.abs() >= 1.0, "{text}");
            assert!(!text.contains('e'), "{text}");
        }
    }

    #[test]
    fn test_floats_use_exponent() {
        for text in floats(2, 50) {
            assert!(text.contains('e'), "{text}");
            assert!(text.parse::<f64>().unwrap().is_finite());
        }
    }
}
