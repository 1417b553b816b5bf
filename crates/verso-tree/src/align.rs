//! Sequence alignment helpers.
//!
//! Sequences are passed as ascending lists of indices into the caller's
//! slices, so a gap left over by one pass can be aligned again by the next.

/// Longest common subsequence of `a` and `b` under `eq`.
///
/// Returns the matched `(a_index, b_index)` pairs in ascending order.
pub(crate) fn lcs<F>(a: &[usize], b: &[usize], eq: F) -> Vec<(usize, usize)>
where
    F: Fn(usize, usize) -> bool,
{
    let (m, n) = (a.len(), b.len());
    let mut table = vec![vec![0u32; n + 1]; m + 1];
    for i in (0..m).rev() {
        for j in (0..n).rev() {
            table[i][j] = if eq(a[i], b[j]) {
                table[i + 1][j + 1] + 1
            } else {
                table[i + 1][j].max(table[i][j + 1])
            };
        }
    }

    let mut pairs = Vec::with_capacity(table[0][0] as usize);
    let (mut i, mut j) = (0, 0);
    while i < m && j < n {
        if eq(a[i], b[j]) {
            pairs.push((a[i], b[j]));
            i += 1;
            j += 1;
        } else if table[i + 1][j] >= table[i][j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }
    pairs
}

/// A run of unmatched indices from both sides.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Gap {
    pub old: Vec<usize>,
    pub new: Vec<usize>,
}

/// Split `a` and `b` around the matched `pairs`.
///
/// Always returns `pairs.len() + 1` gaps: the one before each pair, then the
/// tail.
pub(crate) fn gaps(pairs: &[(usize, usize)], a: &[usize], b: &[usize]) -> Vec<Gap> {
    fn take_until(list: &[usize], pos: &mut usize, stop: usize) -> Vec<usize> {
        let mut run = Vec::new();
        while let Some(&x) = list.get(*pos) {
            *pos += 1;
            if x == stop {
                break;
            }
            run.push(x);
        }
        run
    }

    let (mut ia, mut ib) = (0, 0);
    let mut out = Vec::with_capacity(pairs.len() + 1);
    for &(i, j) in pairs {
        out.push(Gap {
            old: take_until(a, &mut ia, i),
            new: take_until(b, &mut ib, j),
        });
    }
    out.push(Gap {
        old: a.get(ia..).unwrap_or_default().to_vec(),
        new: b.get(ib..).unwrap_or_default().to_vec(),
    });
    out
}

/// Pair candidates in order: each `b` index takes the first remaining `a`
/// index after the previous match for which `eq` holds.
pub(crate) fn pair_in_order<F>(a: &[usize], b: &[usize], eq: F) -> Vec<(usize, usize)>
where
    F: Fn(usize, usize) -> bool,
{
    let mut pairs = Vec::new();
    let mut start = 0;
    for &j in b {
        let rest = a.get(start..).unwrap_or_default();
        if let Some(pos) = rest.iter().position(|&i| eq(i, j)) {
            pairs.push((rest[pos], j));
            start += pos + 1;
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx(n: usize) -> Vec<usize> {
        (0..n).collect()
    }

    #[test]
    fn lcs_of_strings() {
        let a: Vec<char> = "ABCBDAB".chars().collect();
        let b: Vec<char> = "BDCABA".chars().collect();
        let pairs = lcs(&idx(a.len()), &idx(b.len()), |i, j| a[i] == b[j]);
        assert_eq!(pairs.len(), 4);
        assert!(pairs.windows(2).all(|w| w[0].0 < w[1].0 && w[0].1 < w[1].1));
        assert!(pairs.iter().all(|&(i, j)| a[i] == b[j]));
    }

    #[test]
    fn lcs_with_empty_side() {
        assert!(lcs(&[], &idx(3), |_, _| true).is_empty());
        assert!(lcs(&idx(3), &[], |_, _| true).is_empty());
    }

    #[test]
    fn gaps_around_pairs() {
        let a = [0, 1, 2, 3];
        let b = [0, 1, 2];
        let g = gaps(&[(1, 0), (3, 2)], &a, &b);
        assert_eq!(
            g,
            vec![
                Gap { old: vec![0], new: vec![] },
                Gap { old: vec![2], new: vec![1] },
                Gap { old: vec![], new: vec![] },
            ]
        );
    }

    #[test]
    fn gaps_over_sparse_indices() {
        let g = gaps(&[(5, 2)], &[3, 5, 9], &[2, 4]);
        assert_eq!(
            g,
            vec![Gap { old: vec![3], new: vec![] }, Gap { old: vec![9], new: vec![4] }]
        );
    }

    #[test]
    fn in_order_pairing_never_crosses() {
        // b[0] matches a[2]; b[1] would match a[0] but that is behind.
        let a = ['x', 'y', 'z'];
        let b = ['z', 'x'];
        let pairs = pair_in_order(&idx(3), &idx(2), |i, j| a[i] == b[j]);
        assert_eq!(pairs, vec![(2, 0)]);
    }
}
