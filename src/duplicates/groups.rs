//! Size grouping and content-class structures.
//!
//! # Overview
//!
//! Size grouping is the first phase of classification. Files with different
//! sizes cannot share content, so a size shared by no other file certifies its
//! file as unique without reading a byte. Only sizes shared by two or more
//! files move on to hashing.
//!
//! Groups are kept in input order: a group's position is the input index of
//! its first member, and members keep their relative input order.
//!
//! # Example
//!
//! ```
//! use dupfilter::scanner::FileRecord;
//! use dupfilter::duplicates::{group_by_size, partition_by_ambiguity};
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     FileRecord::new(0, PathBuf::from("/file1.txt"), 1024),
//!     FileRecord::new(1, PathBuf::from("/file2.txt"), 1024),
//!     FileRecord::new(2, PathBuf::from("/file3.txt"), 2048),
//! ];
//!
//! let (groups, stats) = group_by_size(files);
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.ambiguous_files, 2);
//!
//! let (unique, ambiguous) = partition_by_ambiguity(groups);
//! assert_eq!(unique.len(), 1);
//! assert_eq!(ambiguous.len(), 1);
//! ```

use std::collections::HashMap;

use crate::scanner::{FileRecord, Hash};

/// A group of files with the same size.
#[derive(Debug, Clone)]
pub struct SizeGroup {
    /// File size in bytes (shared by all files in this group)
    pub size: u64,
    /// Files with this exact size, in input order
    pub files: Vec<FileRecord>,
}

impl SizeGroup {
    /// Create an empty size group.
    #[must_use]
    pub fn new(size: u64) -> Self {
        Self {
            size,
            files: Vec::new(),
        }
    }

    /// Add a file to this group.
    ///
    /// # Panics
    ///
    /// Debug assertion fails if file size doesn't match group size.
    pub fn add(&mut self, file: FileRecord) {
        debug_assert_eq!(
            file.size, self.size,
            "File size {} doesn't match group size {}",
            file.size, self.size
        );
        self.files.push(file);
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Whether this size is shared, so its files need hashing.
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        self.files.len() > 1
    }
}

/// Files sharing one content digest.
///
/// The first member is the representative of the class.
#[derive(Debug, Clone)]
pub struct HashGroup {
    /// Content digest shared by every member
    pub hash: Hash,
    /// File size in bytes
    pub size: u64,
    /// Members in input order
    pub files: Vec<FileRecord>,
}

impl HashGroup {
    /// Number of files sharing this content.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The earliest input file with this content.
    #[must_use]
    pub fn representative(&self) -> Option<&FileRecord> {
        self.files.first()
    }

    /// Hash as hexadecimal string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        crate::scanner::hash_to_hex(&self.hash)
    }
}

/// Statistics from size grouping phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Number of distinct file sizes
    pub distinct_sizes: usize,
    /// Files certified unique by size alone
    pub unique_by_size: usize,
    /// Files whose size is shared and must be hashed
    pub ambiguous_files: usize,
    /// Number of size groups with 2+ files
    pub ambiguous_groups: usize,
}

impl GroupingStats {
    /// Percentage of files resolved without hashing.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.unique_by_size as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Group files by size.
///
/// Returns every size group, singletons included, ordered by the input index
/// of each group's first member. Runs in O(n) with no file I/O.
///
/// # Example
///
/// ```
/// use dupfilter::scanner::FileRecord;
/// use dupfilter::duplicates::group_by_size;
/// use std::path::PathBuf;
///
/// let files = vec![
///     FileRecord::new(0, PathBuf::from("/a.txt"), 200),
///     FileRecord::new(1, PathBuf::from("/b.txt"), 100),
///     FileRecord::new(2, PathBuf::from("/c.txt"), 200),
/// ];
///
/// let (groups, stats) = group_by_size(files);
/// assert_eq!(groups.len(), 2);
/// assert_eq!(groups[0].size, 200);
/// assert_eq!(groups[0].len(), 2);
/// assert_eq!(stats.unique_by_size, 1);
/// ```
#[must_use]
pub fn group_by_size(
    files: impl IntoIterator<Item = FileRecord>,
) -> (Vec<SizeGroup>, GroupingStats) {
    let mut groups: Vec<SizeGroup> = Vec::new();
    let mut slots: HashMap<u64, usize> = HashMap::new();
    let mut stats = GroupingStats::default();

    for file in files {
        stats.total_files += 1;
        let slot = *slots.entry(file.size).or_insert_with(|| {
            groups.push(SizeGroup::new(file.size));
            groups.len() - 1
        });
        groups[slot].add(file);
    }

    stats.distinct_sizes = groups.len();
    for group in &groups {
        if group.is_ambiguous() {
            stats.ambiguous_files += group.len();
            stats.ambiguous_groups += 1;
            log::debug!(
                "Size group {} bytes: {} candidates",
                group.size,
                group.len()
            );
        } else {
            stats.unique_by_size += 1;
        }
    }

    log::info!(
        "Size grouping complete: {} files → {} need hashing ({:.1}% resolved by size)",
        stats.total_files,
        stats.ambiguous_files,
        stats.elimination_rate()
    );

    (groups, stats)
}

/// Split size groups into size-unique files and ambiguous groups.
///
/// Both outputs keep the order of `groups`.
#[must_use]
pub fn partition_by_ambiguity(groups: Vec<SizeGroup>) -> (Vec<FileRecord>, Vec<SizeGroup>) {
    let mut unique = Vec::new();
    let mut ambiguous = Vec::new();

    for group in groups {
        if group.is_ambiguous() {
            ambiguous.push(group);
        } else {
            log::trace!("Unique size {}: {:?}", group.size, group.files.first().map(|f| &f.path));
            unique.extend(group.files);
        }
    }

    (unique, ambiguous)
}
