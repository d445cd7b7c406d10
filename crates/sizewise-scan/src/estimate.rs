//! Quick size estimate from a sample of a directory's entries.

use std::path::Path;

use sizewise_core::ScanError;
use tracing::debug;

use crate::fs::FileSystem;

/// Estimate the size of the immediate entries of `path` without recursing.
///
/// Listings with at most `sample_size` entries are summed exactly from their listing
/// metadata. Larger listings are sampled at a fixed stride and the mean sampled size is
/// extrapolated to the full entry count. Entries whose metadata is unavailable are
/// stepped over until `sample_size` usable samples are found; with no usable sample the estimate is 0. Directory entries
/// contribute their own record size, not their content.
pub fn estimate_directory_size(
    fs: &dyn FileSystem,
    path: &Path,
    sample_size: usize,
) -> Result<u64, ScanError> {
    let items = fs.read_dir(path).map_err(|e| ScanError::io(path, e))?;
    let sample_size = sample_size.max(1);

    if items.len() <= sample_size {
        return Ok(items.iter().filter_map(|i| i.stat).map(|s| s.size).sum());
    }

    let step = items.len() / sample_size;
    let sizes: Vec<u64> = items
        .iter()
        .step_by(step)
        .filter_map(|i| i.stat)
        .take(sample_size)
        .map(|s| s.size)
        .collect();

    if sizes.is_empty() {
        return Ok(0);
    }
    let average = sizes.iter().sum::<u64>() / sizes.len() as u64;
    debug!(path = %path.display(), sampled = sizes.len(), entries = items.len(), average, "estimated directory size");
    Ok(average * items.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memfs::MemFs;

    #[test]
    fn test_small_listing_is_exact() {
        let mut fs = MemFs::new("/e");
        fs.file("/e/a", 100).file("/e/b", 250).unprobeable("/e/c");
        assert_eq!(estimate_directory_size(&fs, Path::new("/e"), 20).unwrap(), 350);
    }

    #[test]
    fn test_uniform_listing_extrapolates() {
        let mut fs = MemFs::new("/e");
        for i in 0..1000 {
            fs.file(format!("/e/f{i}"), 512);
        }
        assert_eq!(estimate_directory_size(&fs, Path::new("/e"), 20).unwrap(), 512_000);
    }

    #[test]
    fn test_failed_probes_do_not_shrink_sample() {
        // 59 entries, 20 samples: step 2 gives 30 stride positions. The first ten
        // positions fail, so the sample reaches past position 38 to fill up.
        let mut fs = MemFs::new("/e");
        for i in 0..59 {
            let path = format!("/e/f{i:02}");
            match i {
                i if i % 2 == 1 => fs.file(path, 1),
                i if i < 20 => fs.unprobeable(path),
                i if i < 40 => fs.file(path, 100),
                _ => fs.file(path, 400),
            };
        }
        // Ten samples of 100 and ten of 400 average to 250.
        assert_eq!(estimate_directory_size(&fs, Path::new("/e"), 20).unwrap(), 250 * 59);
    }

    #[test]
    fn test_no_usable_sample() {
        let mut fs = MemFs::new("/e");
        for i in 0..50 {
            fs.unprobeable(format!("/e/x{i}"));
        }
        assert_eq!(estimate_directory_size(&fs, Path::new("/e"), 10).unwrap(), 0);
    }

    #[test]
    fn test_unlistable_is_error() {
        let mut fs = MemFs::new("/e");
        fs.unlistable("/e/locked", 4096);
        let err = estimate_directory_size(&fs, Path::new("/e/locked"), 10).unwrap_err();
        assert!(matches!(err, ScanError::PermissionDenied { .. }));
    }
}
