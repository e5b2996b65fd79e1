//! Partition-exchange sort which forks large partitions onto the rayon pool.
//!
//! Small inputs are sorted on the calling thread. Once a range reaches the
//! threshold it is partitioned once around its middle element and both halves
//! are sorted concurrently with [`rayon::join`]. The halves are disjoint
//! sub-slices of the same buffer, so neither branch can observe the other.
//!
//! The sort is unstable: equal elements may be reordered.
//!
//! ```rust
//! let mut numbers: Vec<u32> = (1..=3000).rev().collect();
//! kiln_sort::sort(&mut numbers);
//! assert_eq!(numbers.first(), Some(&1));
//! assert_eq!(numbers.last(), Some(&3000));
//! ```

use std::cmp::Ordering;

/// Ranges shorter than this are sorted without forking
pub const SEQUENTIAL_THRESHOLD: usize = 2048;

/// Sorts the slice in ascending order, forking above [`SEQUENTIAL_THRESHOLD`]
pub fn sort<T: Ord + Send>(items: &mut [T]) {
    sort_by(items, Ord::cmp)
}

/// Sorts the slice with a comparator, forking above [`SEQUENTIAL_THRESHOLD`]
pub fn sort_by<T, F>(items: &mut [T], compare: F)
where
    T: Send,
    F: Fn(&T, &T) -> Ordering + Sync,
{
    sort_by_with_threshold(items, SEQUENTIAL_THRESHOLD, compare)
}

/// Sorts the slice with a comparator, forking once a range holds `threshold` elements or more.
///
/// A threshold of 0 is treated as 1.
pub fn sort_by_with_threshold<T, F>(items: &mut [T], threshold: usize, compare: F)
where
    T: Send,
    F: Fn(&T, &T) -> Ordering + Sync,
{
    quicksort_parallel(items, threshold.max(1), &compare)
}

/// Sorts the slice on the calling thread only
pub fn sort_sequential<T: Ord>(items: &mut [T]) {
    sort_sequential_by(items, Ord::cmp)
}

/// Sorts the slice with a comparator on the calling thread only
pub fn sort_sequential_by<T, F>(items: &mut [T], compare: F)
where
    F: Fn(&T, &T) -> Ordering,
{
    quicksort_sequential(items, &compare)
}

fn quicksort_parallel<T, F>(mut items: &mut [T], threshold: usize, compare: &F)
where
    T: Send,
    F: Fn(&T, &T) -> Ordering + Sync,
{
    while items.len() > 1 && items.len() >= threshold {
        let (left, right) = split_around_pivot(std::mem::take(&mut items), compare);

        if !left.is_empty() && !right.is_empty() {
            rayon::join(
                || quicksort_parallel(left, threshold, compare),
                || quicksort_parallel(right, threshold, compare),
            );
            return;
        }

        // Pivot was an extreme, nothing to fork
        items = if left.is_empty() { right } else { left };
    }

    quicksort_sequential(items, compare);
}

fn quicksort_sequential<T, F>(mut items: &mut [T], compare: &F)
where
    F: Fn(&T, &T) -> Ordering,
{
    // Recurse into the smaller side and loop over the larger one, keeping the stack shallow
    while items.len() > 1 {
        let (left, right) = split_around_pivot(std::mem::take(&mut items), compare);

        if left.len() < right.len() {
            quicksort_sequential(left, compare);
            items = right;
        } else {
            quicksort_sequential(right, compare);
            items = left;
        }
    }
}

/// Partitions the slice and returns the parts still to sort, without the run of pivot keys
fn split_around_pivot<'a, T, F>(items: &'a mut [T], compare: &F) -> (&'a mut [T], &'a mut [T])
where
    F: Fn(&T, &T) -> Ordering,
{
    let (low, high) = partition(items, compare);
    let (left, rest) = items.split_at_mut(low);
    (left, &mut rest[high - low..])
}

/// Partitions around the middle element into less, equal and greater runs.
///
/// Returns the bounds of the equal run, which is already in its final position.
fn partition<T, F>(items: &mut [T], compare: &F) -> (usize, usize)
where
    F: Fn(&T, &T) -> Ordering,
{
    let last = items.len() - 1;
    items.swap(0, last / 2);

    // items[1..less] < pivot, items[less..next] == pivot, items[greater..] > pivot
    let mut less = 1;
    let mut next = 1;
    let mut greater = items.len();
    while next < greater {
        match compare(&items[next], &items[0]) {
            Ordering::Less => {
                items.swap(less, next);
                less += 1;
                next += 1;
            }
            Ordering::Greater => {
                greater -= 1;
                items.swap(next, greater);
            }
            Ordering::Equal => next += 1,
        }
    }

    items.swap(0, less - 1);
    (less - 1, greater)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn descending(max: u32) -> Vec<u32> {
        (1..=max).rev().collect()
    }

    #[test]
    fn parallel_sort_orders_reversed_input() {
        let mut numbers = descending(3000);
        sort(&mut numbers);

        assert_eq!(numbers, (1..=3000).collect::<Vec<_>>());
    }

    #[test]
    fn below_threshold_takes_sequential_path() {
        let mut numbers = descending(1000);
        sort(&mut numbers);

        assert_eq!(numbers[0], 1);
        assert_eq!(numbers[999], 1000);
    }

    #[test]
    fn direct_sequential_sort() {
        let mut numbers = descending(1000);
        sort_sequential(&mut numbers);

        assert_eq!(numbers, (1..=1000).collect::<Vec<_>>());
    }

    #[test]
    fn partition_places_pivot() {
        let mut numbers = vec![5, 1, 9, 3, 7];
        let (low, high) = partition(&mut numbers, &u32::cmp);

        // middle element (9) ends up last
        assert_eq!((low, high), (4, 5));
        assert_eq!(numbers[low], 9);
        assert!(numbers[..low].iter().all(|n| *n < 9));
    }

    #[test]
    fn partition_groups_equal_keys() {
        let mut numbers = vec![2, 1, 2, 3, 2];
        let (low, high) = partition(&mut numbers, &u32::cmp);

        assert_eq!((low, high), (1, 4));
        assert_eq!(numbers, vec![1, 2, 2, 2, 3]);
    }

    #[test]
    fn few_distinct_keys_split_once_per_key() {
        // Input counts of a typical recipe batch, mostly ties
        let mut counts: Vec<usize> = (0..50_000).map(|n| n % 3).collect();
        let calls = Cell::new(0usize);
        sort_sequential_by(&mut counts, |a: &usize, b: &usize| {
            calls.set(calls.get() + 1);
            a.cmp(b)
        });
        let calls = calls.get();

        assert!(counts.windows(2).all(|pair| pair[0] <= pair[1]));
        // One linear pass per distinct key instead of one per element
        assert!(calls < 50_000 * 4, "{calls} comparisons");
    }

    #[test]
    fn comparator_controls_order() {
        let mut words = vec!["ccc", "a", "bb", "dddd"];
        sort_by_with_threshold(&mut words, 2, |a, b| b.len().cmp(&a.len()));

        assert_eq!(words, vec!["dddd", "ccc", "bb", "a"]);
    }

    #[test]
    fn zero_threshold_is_clamped() {
        let mut numbers = descending(64);
        sort_by_with_threshold(&mut numbers, 0, u32::cmp);

        assert_eq!(numbers, (1..=64).collect::<Vec<_>>());
    }

    #[test]
    fn handles_trivial_inputs() {
        let mut empty: Vec<u8> = vec![];
        sort(&mut empty);
        assert!(empty.is_empty());

        let mut single = vec![42];
        sort(&mut single);
        assert_eq!(single, vec![42]);

        let mut same = vec![7; 5000];
        sort(&mut same);
        assert!(same.iter().all(|n| *n == 7));
    }
}
