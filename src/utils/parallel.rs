#[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
use rayon::prelude::*;

/// Below this many items the work stays on the calling thread.
#[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
const PARALLEL_THRESHOLD: usize = 4;

// Output order always matches input order.
#[inline]
pub fn map<T, R, F>(collection: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    #[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
    {
        if collection.len() >= PARALLEL_THRESHOLD {
            collection.par_iter().map(f).collect()
        } else {
            collection.iter().map(f).collect()
        }
    }
    #[cfg(any(not(feature = "parallel"), target_arch = "wasm32"))]
    {
        collection.iter().map(f).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_keeps_order() {
        let items: Vec<usize> = (0..100).collect();
        let doubled = map(&items, |x| x * 2);
        assert_eq!(doubled, (0..100).map(|x| x * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_map_at_threshold() {
        let words = ["a", "bb", "ccc", "dddd"];
        assert_eq!(map(&words, |w| w.len()), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_map_small_input() {
        assert_eq!(map(&[3, 1], |x| x + 1), vec![4, 2]);
        assert!(map(&[] as &[i32], |x| *x).is_empty());
    }
}
