//! Diagnostic views. The text layouts are for humans and may change.

use crate::directory::Directory;
use crate::table::{TableId, TableStats};
use core::fmt;

/// Per-table figures for both sides of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    /// Table 1, addressed by h1.
    pub first: TableStats,
    /// Table 2, addressed by h2.
    pub second: TableStats,
}

impl Stats {
    /// Keys stored across both tables.
    pub fn keys(&self) -> usize {
        self.first.keys + self.second.keys
    }

    /// Distinct buckets across both tables.
    pub fn buckets(&self) -> usize {
        self.first.buckets + self.second.buckets
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- table stats ---")?;
        for (id, t) in [(TableId::First, &self.first), (TableId::Second, &self.second)] {
            writeln!(f, "{} size: {} (depth {})", id, t.slots, t.depth)?;
            writeln!(f, "        keys: {}", t.keys)?;
            writeln!(f, "     buckets: {}", t.buckets)?;
        }
        write!(f, "--- end stats ---")
    }
}

/// Slot-by-slot listing of both directories, returned by
/// [`ExtendibleCuckoo::dump`](crate::ExtendibleCuckoo::dump). Keys print as
/// their unsigned 64-bit pattern, so `-1` shows as `18446744073709551615`.
pub struct Dump<'a> {
    pub(crate) tables: [(TableId, &'a Directory); 2],
}

impl fmt::Display for Dump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- table ---")?;
        for (id, dir) in self.tables {
            writeln!(f, "{}", id)?;
            writeln!(f, "  table:               buckets:")?;
            writeln!(f, "  address | bucketid   bucketid [key]")?;
            for address in 0..dir.size() {
                let bucket = dir.bucket_at(address);
                write!(f, "{:>9} | {:<9} ", address, bucket.id)?;
                // Each bucket is printed once, next to its canonical slot.
                if bucket.id == address {
                    write!(f, "{:>9} [", bucket.id)?;
                    for i in 0..dir.bucket_capacity() {
                        match bucket.keys().get(i) {
                            Some(&k) => write!(f, " {}", k as u64)?,
                            None => write!(f, " -")?,
                        }
                    }
                    write!(f, " ]")?;
                }
                writeln!(f)?;
            }
        }
        write!(f, "--- end table ---")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_totals_and_display() {
        let s = Stats {
            first: TableStats {
                keys: 3,
                depth: 1,
                slots: 2,
                buckets: 2,
            },
            second: TableStats {
                keys: 2,
                depth: 0,
                slots: 1,
                buckets: 1,
            },
        };
        assert_eq!(s.keys(), 5);
        assert_eq!(s.buckets(), 3);
        let text = s.to_string();
        assert!(text.starts_with("--- table stats ---"));
        assert!(text.contains("table 1 size: 2 (depth 1)"));
        assert!(text.contains("table 2 size: 1 (depth 0)"));
        assert!(text.ends_with("--- end stats ---"));
    }

    #[test]
    fn dump_lists_canonical_buckets_once() {
        let mut d1 = Directory::new(2);
        d1.bucket_at_mut(0).try_push(4).unwrap();
        d1.split(0, 4, |k| k as u64).unwrap();
        let d2 = Directory::new(2);
        let text = Dump {
            tables: [(TableId::First, &d1), (TableId::Second, &d2)],
        }
        .to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "--- table ---");
        assert_eq!(lines[1], "table 1");
        assert_eq!(lines[4], "        0 | 0                 0 [ 4 - ]");
        assert_eq!(lines[5], "        1 | 1                 1 [ - - ]");
        assert_eq!(lines[6], "table 2");
        assert_eq!(lines[9], "        0 | 0                 0 [ - - ]");
        assert_eq!(*lines.last().unwrap(), "--- end table ---");
    }

    #[test]
    fn dump_prints_keys_unsigned() {
        let mut d1 = Directory::new(1);
        d1.bucket_at_mut(0).try_push(-1).unwrap();
        let d2 = Directory::new(1);
        let text = Dump {
            tables: [(TableId::First, &d1), (TableId::Second, &d2)],
        }
        .to_string();
        assert!(text.contains("        0 | 0                 0 [ 18446744073709551615 ]"));
        assert!(!text.contains("-1"));
    }
}
