//! Sampling classifier for directories dominated by small files.

use sizewise_core::ScanConfig;

use crate::fs::DirItem;

/// Indices sampled from a listing of `len` items: `i * len / sample_size`.
pub(crate) fn sample_indices(len: usize, sample_size: usize) -> impl Iterator<Item = usize> {
    let count = sample_size.min(len);
    (0..count).map(move |i| i * len / count)
}

/// Decide whether a directory listing is dominated by small files.
///
/// Up to `config.sample_size` evenly spaced items are inspected using their listing
/// metadata. Directories and items whose metadata is unavailable are left out of the
/// sample. The listing is small-file-heavy when strictly more than
/// `config.small_file_ratio` of the sampled items are below `config.small_file_threshold`.
pub fn is_small_file_heavy(items: &[DirItem], config: &ScanConfig) -> bool {
    let mut sampled = 0usize;
    let mut small = 0usize;

    for idx in sample_indices(items.len(), config.sample_size) {
        let Some(stat) = items[idx].stat else {
            continue;
        };
        if stat.is_dir() {
            continue;
        }
        sampled += 1;
        if stat.size < config.small_file_threshold {
            small += 1;
        }
    }

    sampled > 0 && small as f64 > sampled as f64 * config.small_file_ratio
}

#[cfg(test)]
mod tests {
    use super::*;
    use sizewise_core::Stat;
    use std::collections::HashSet;

    const SMALL: u64 = 1024;
    const LARGE: u64 = 64 * 1024;

    /// `len` files where exactly `small` of the sampled positions hold small files.
    fn listing(len: usize, sample_size: usize, small: usize) -> Vec<DirItem> {
        let small_at: HashSet<usize> = sample_indices(len, sample_size).take(small).collect();
        (0..len)
            .map(|i| {
                let size = if small_at.contains(&i) { SMALL } else { LARGE };
                DirItem::new(format!("/d/f{i}"), Some(Stat::file(size)))
            })
            .collect()
    }

    fn config(sample_size: usize) -> ScanConfig {
        ScanConfig::builder().sample_size(sample_size).build().unwrap()
    }

    #[test]
    fn test_sample_indices_spread() {
        let idx: Vec<usize> = sample_indices(101, 20).collect();
        assert_eq!(idx.len(), 20);
        assert_eq!(idx[0], 0);
        assert_eq!(idx[1], 5);
        assert_eq!(idx[19], 95);
        assert_eq!(sample_indices(3, 20).count(), 3);
    }

    #[test]
    fn test_ratio_boundary() {
        // 19 of 25 sampled files small is 76%.
        assert!(is_small_file_heavy(&listing(101, 25, 19), &config(25)));
        // 15 of 20 is exactly 75%, which is not enough.
        assert!(!is_small_file_heavy(&listing(101, 20, 15), &config(20)));
        assert!(is_small_file_heavy(&listing(101, 20, 16), &config(20)));
    }

    #[test]
    fn test_all_small_and_all_large() {
        let config = ScanConfig::default();
        assert!(is_small_file_heavy(&listing(150, 20, 20), &config));
        assert!(!is_small_file_heavy(&listing(150, 20, 0), &config));
    }

    #[test]
    fn test_directories_are_not_sampled() {
        let items: Vec<DirItem> = (0..120)
            .map(|i| DirItem::new(format!("/d/sub{i}"), Some(Stat::directory(4096))))
            .collect();
        assert!(!is_small_file_heavy(&items, &ScanConfig::default()));
    }

    #[test]
    fn test_failed_probes_are_excluded() {
        let mut items = listing(101, 20, 15);
        assert!(!is_small_file_heavy(&items, &ScanConfig::default()));
        // Two sampled large files become unreadable: 15 of 18 is over the threshold.
        for idx in sample_indices(101, 20).skip(15).take(2) {
            items[idx].stat = None;
        }
        assert!(is_small_file_heavy(&items, &ScanConfig::default()));
    }
}
