pub const MAX_EDIT_LEN: usize = 32;

#[inline]
pub fn hamming(a: &[u8], b: &[u8]) -> Option<usize> {
    if a.len() != b.len() {
        return None;
    }
    Some(a.iter().zip(b).filter(|(x, y)| x != y).count())
}

#[inline]
pub fn hamming_within(a: &[u8], b: &[u8], limit: usize) -> Option<usize> {
    if a.len() != b.len() {
        return None;
    }
    let mut mismatches = 0;
    for (x, y) in a.iter().zip(b) {
        if x != y {
            mismatches += 1;
            if mismatches > limit {
                return None;
            }
        }
    }
    Some(mismatches)
}

// Two rows of at most [`MAX_EDIT_LEN`] + 1 cells live on the stack; longer
// inputs fall back to heap rows.
pub fn levenshtein(a: &[u8], b: &[u8]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    if b.len() <= MAX_EDIT_LEN {
        let mut prev = [0usize; MAX_EDIT_LEN + 1];
        let mut curr = [0usize; MAX_EDIT_LEN + 1];
        levenshtein_rows(a, b, &mut prev[..=b.len()], &mut curr[..=b.len()])
    } else {
        let mut prev = vec![0usize; b.len() + 1];
        let mut curr = vec![0usize; b.len() + 1];
        levenshtein_rows(a, b, &mut prev, &mut curr)
    }
}

fn levenshtein_rows<'a>(
    a: &[u8],
    b: &[u8],
    mut prev: &'a mut [usize],
    mut curr: &'a mut [usize],
) -> usize {
    for (j, cell) in prev.iter_mut().enumerate() {
        *cell = j;
    }

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            let deletion = prev[j + 1] + 1;
            let insertion = curr[j] + 1;
            curr[j + 1] = substitution.min(deletion).min(insertion);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hamming() {
        assert_eq!(hamming(b"ACGTAC", b"ACGTAC"), Some(0));
        assert_eq!(hamming(b"ACGTAC", b"ACCTAA"), Some(2));
        assert_eq!(hamming(b"ACGTA", b"ACGTAC"), None);
    }

    #[test]
    fn test_hamming_within_limit() {
        assert_eq!(hamming_within(b"TAGCCATCGCATTGC", b"TAGCCATCGCATTGA", 1), Some(1));
        assert_eq!(hamming_within(b"TAGCCATCGCATTGC", b"AAGCCATCGCATTGA", 1), None);
        assert_eq!(hamming_within(b"AC", b"ACG", 3), None);
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein(b"", b""), 0);
        assert_eq!(levenshtein(b"", b"GCA"), 3);
        assert_eq!(levenshtein(b"TGCG", b""), 4);
        assert_eq!(levenshtein(b"GCA", b"GCA"), 0);
        assert_eq!(levenshtein(b"GCAA", b"GCA"), 1);
        assert_eq!(levenshtein(b"TCG", b"TGCG"), 1);
        assert_eq!(levenshtein(b"kitten", b"sitting"), 3);
    }

    #[test]
    fn test_levenshtein_long_inputs() {
        let a = vec![b'A'; 40];
        let mut b = a.clone();
        b[10] = b'C';
        b.push(b'G');
        assert_eq!(levenshtein(&a, &b), 2);
    }

    #[test]
    fn test_levenshtein_rows_swap_over_several_rows() {
        assert_eq!(levenshtein(b"ATCGA", b"ATCG"), 1);
        assert_eq!(levenshtein(b"ATGGA", b"ATCGA"), 1);
        assert_eq!(levenshtein(b"GCATG", b"TGCG"), 3);
    }
}
