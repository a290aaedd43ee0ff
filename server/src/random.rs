//! Weighted random selection shared by spawning, loot and encounters.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// Pick one item with probability proportional to its weight.
///
/// Returns `None` when `items` is empty or no weight is positive.
/// Negative and non-finite weights count as zero.
pub fn weighted_choice<'a, T, R: Rng + ?Sized>(
    rng: &mut R,
    items: &'a [T],
    weight: impl Fn(&T) -> f64,
) -> Option<&'a T> {
    let weights: Vec<f64> = items
        .iter()
        .map(|item| {
            let w = weight(item);
            if w.is_finite() && w > 0.0 {
                w
            } else {
                0.0
            }
        })
        .collect();

    let dist = WeightedIndex::new(&weights).ok()?;
    items.get(dist.sample(rng))
}

/// Roll a probability in `[0, 1]`
pub fn chance<R: Rng + ?Sized>(rng: &mut R, probability: f64) -> bool {
    if probability <= 0.0 {
        return false;
    }
    if probability >= 1.0 {
        return true;
    }
    rng.gen_bool(probability)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_empty_and_zero_weights() {
        let mut rng = StdRng::seed_from_u64(1);
        let empty: [(&str, f64); 0] = [];
        assert!(weighted_choice(&mut rng, &empty, |i| i.1).is_none());

        let zeros = [("a", 0.0), ("b", -1.0)];
        assert!(weighted_choice(&mut rng, &zeros, |i| i.1).is_none());
    }

    #[test]
    fn test_zero_weight_never_chosen() {
        let mut rng = StdRng::seed_from_u64(7);
        let items = [("never", 0.0), ("always", 1.0)];
        for _ in 0..200 {
            assert_eq!(weighted_choice(&mut rng, &items, |i| i.1).unwrap().0, "always");
        }
    }

    #[test]
    fn test_weights_are_respected() {
        let mut rng = StdRng::seed_from_u64(42);
        let items = [("heavy", 9.0), ("light", 1.0)];
        let heavy = (0..10_000)
            .filter(|_| weighted_choice(&mut rng, &items, |i| i.1).unwrap().0 == "heavy")
            .count();
        assert!((8_700..9_300).contains(&heavy), "heavy picked {} times", heavy);
    }

    #[test]
    fn test_chance_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(!chance(&mut rng, 0.0));
        assert!(chance(&mut rng, 1.0));
        assert!(!chance(&mut rng, -0.5));
    }
}
