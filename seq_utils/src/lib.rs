//! Crate for comparing and transforming short DNA index sequences
#![deny(missing_docs)]

use bio::alphabets::dna;

/// Return the complement of a single base. Only `ACGT` (either case) are
/// complemented, every other character is returned unchanged, including
/// IUPAC ambiguity codes.
pub fn complement(base: char) -> char {
    match base {
        'A' | 'C' | 'G' | 'T' | 'a' | 'c' | 'g' | 't' => dna::complement(base as u8) as char,
        _ => base,
    }
}

/// An iterator over the reverse complement of given sequence.
pub fn revcomp_iter(seq: &str) -> impl Iterator<Item = char> + '_ {
    seq.chars().rev().map(complement)
}

/// Calculate the reverse complement of given sequence.
///
/// Ambiguity codes such as `N` pass through unchanged, so
/// `reverse_complement("ACGTN") == "NACGT"`.
pub fn reverse_complement(seq: &str) -> String {
    revcomp_iter(seq).collect()
}

/// Number of mismatching positions between two sequences.
///
/// Sequences of unequal length are compared over their common prefix only:
/// the sequencer reads a fixed number of index cycles, so trailing bases of
/// the longer index are never seen.
pub fn hamming_distance(a: impl AsRef<[u8]>, b: impl AsRef<[u8]>) -> usize {
    let (a, b) = (a.as_ref(), b.as_ref());
    let len = a.len().min(b.len());
    triple_accel::hamming(&a[..len], &b[..len]) as usize
}

/// Count how many of the first `max` bases of `seq` equal `base`, stopping at
/// the first base that differs. The comparison ignores case.
pub fn leading_base_count(seq: &str, base: char, max: usize) -> usize {
    seq.chars()
        .take(max)
        .take_while(|c| c.eq_ignore_ascii_case(&base))
        .count()
}
