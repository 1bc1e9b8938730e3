//! Reverse subsequence matching with a contiguity bonus.
//!
//! The query is consumed from its last byte to its first while scanning the
//! file name backwards, then the directory name. Landing matches in the file
//! name first favours the most discriminating part of a path, and adjacent
//! matched bytes score a point each. One linear pass, no backtracking, no
//! allocation.

/// Match quality; higher is better.
pub type Goodness = u32;

/// Scores `query` against a `(dirname, filename)` pair.
///
/// Returns `None` when the query is not a subsequence of `dirname` followed by
/// `filename`. An empty query matches everything with goodness 0. Matching is
/// bytewise and case-sensitive.
pub fn score(dirname: &[u8], filename: &[u8], query: &[u8]) -> Option<Goodness> {
    let mut remaining = query.len();
    if remaining == 0 {
        return Some(0);
    }

    let contig_filename = scan_segment(filename, query, &mut remaining);
    if remaining == 0 {
        return Some(contig_filename);
    }
    // Adjacency does not carry across the filename/dirname boundary.
    let contig_dir = scan_segment(dirname, query, &mut remaining);
    (remaining == 0).then_some(contig_filename + contig_dir)
}

fn scan_segment(hay: &[u8], query: &[u8], remaining: &mut usize) -> Goodness {
    let mut contig = 0;
    let mut last_match: Option<usize> = None;

    for (idx, &byte) in hay.iter().enumerate().rev() {
        if *remaining == 0 {
            break;
        }
        if byte == query[*remaining - 1] {
            *remaining -= 1;
            if last_match == Some(idx + 1) {
                contig += 1;
            }
            last_match = Some(idx);
        }
    }

    contig
}
