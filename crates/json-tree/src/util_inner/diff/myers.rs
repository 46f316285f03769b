//! Sequence diff: Myers O(ND) difference algorithm over slices.
//!
//! Works for any `T: PartialEq`; the JSON differ runs it over `char`s of
//! strings and over array elements. The result is a list of runs. Inside
//! every change block (the edits between two equal runs) deletions come
//! before insertions, so a block reads as "replace `n` items by `m` items".

// ── Types ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Run {
    Equal(usize),
    Delete(usize),
    Insert(usize),
}

/// Trace cells kept before the search gives up and replaces the whole
/// middle section.
const TRACE_BUDGET: usize = 1 << 21;

// ── Public API ────────────────────────────────────────────────────────────

/// Diff `a` into `b`.
///
/// ```
/// use json_tree::util_inner::diff::myers::{diff, Run};
///
/// let runs = diff(&[1, 2, 3, 4], &[1, 9, 3, 4, 5]);
/// assert_eq!(
///     runs,
///     [Run::Equal(1), Run::Delete(1), Run::Insert(1), Run::Equal(2), Run::Insert(1)]
/// );
/// ```
pub fn diff<T: PartialEq>(a: &[T], b: &[T]) -> Vec<Run> {
    let prefix = a.iter().zip(b).take_while(|(x, y)| x == y).count();
    let (a_rest, b_rest) = (&a[prefix..], &b[prefix..]);
    let suffix = a_rest
        .iter()
        .rev()
        .zip(b_rest.iter().rev())
        .take_while(|(x, y)| x == y)
        .count();
    let a_mid = &a_rest[..a_rest.len() - suffix];
    let b_mid = &b_rest[..b_rest.len() - suffix];

    let mut runs = Vec::new();
    push(&mut runs, Run::Equal(prefix));
    for run in middle(a_mid, b_mid) {
        push(&mut runs, run);
    }
    push(&mut runs, Run::Equal(suffix));
    runs
}

/// Appends `run`, merging it into the last run of the same kind and
/// dropping empty runs.
fn push(runs: &mut Vec<Run>, run: Run) {
    match (runs.last_mut(), run) {
        (_, Run::Equal(0) | Run::Delete(0) | Run::Insert(0)) => {}
        (Some(Run::Equal(n)), Run::Equal(m))
        | (Some(Run::Delete(n)), Run::Delete(m))
        | (Some(Run::Insert(n)), Run::Insert(m)) => *n += m,
        _ => runs.push(run),
    }
}

// ── Core ──────────────────────────────────────────────────────────────────

fn middle<T: PartialEq>(a: &[T], b: &[T]) -> Vec<Run> {
    if a.is_empty() || b.is_empty() {
        return vec![Run::Delete(a.len()), Run::Insert(b.len())];
    }
    let (n, m) = (a.len() as isize, b.len() as isize);
    let max = n + m;
    let offset = max;
    let width = 2 * max as usize + 2;
    let mut v = vec![0isize; width];
    let mut trace: Vec<Vec<isize>> = Vec::new();

    for d in 0..=max {
        if (trace.len() + 1) * width > TRACE_BUDGET {
            return vec![Run::Delete(a.len()), Run::Insert(b.len())];
        }
        trace.push(v.clone());
        let mut k = -d;
        while k <= d {
            let idx = (k + offset) as usize;
            let mut x = if k == -d || (k != d && v[idx - 1] < v[idx + 1]) {
                v[idx + 1]
            } else {
                v[idx - 1] + 1
            };
            let mut y = x - k;
            while x < n && y < m && a[x as usize] == b[y as usize] {
                x += 1;
                y += 1;
            }
            v[idx] = x;
            if x >= n && y >= m {
                return backtrack(&trace, n, m, offset);
            }
            k += 2;
        }
    }
    // The loop always reaches (n, m) by d = n + m.
    vec![Run::Delete(a.len()), Run::Insert(b.len())]
}

/// Walks the trace back from `(n, m)` and returns runs in forward order,
/// each change block normalized to deletions then insertions.
fn backtrack(trace: &[Vec<isize>], n: isize, m: isize, offset: isize) -> Vec<Run> {
    let mut steps: Vec<Run> = Vec::new();
    let (mut x, mut y) = (n, m);
    for (d, v) in trace.iter().enumerate().rev() {
        let d = d as isize;
        let k = x - y;
        let idx = (k + offset) as usize;
        let prev_k = if k == -d || (k != d && v[idx - 1] < v[idx + 1]) { k + 1 } else { k - 1 };
        let prev_x = v[(prev_k + offset) as usize];
        let prev_y = prev_x - prev_k;
        while x > prev_x && y > prev_y {
            steps.push(Run::Equal(1));
            x -= 1;
            y -= 1;
        }
        if d > 0 {
            steps.push(if x == prev_x { Run::Insert(1) } else { Run::Delete(1) });
        }
        x = prev_x;
        y = prev_y;
    }
    steps.reverse();

    let mut runs = Vec::new();
    let (mut deleted, mut inserted) = (0, 0);
    for step in steps {
        match step {
            Run::Delete(c) => deleted += c,
            Run::Insert(c) => inserted += c,
            Run::Equal(c) => {
                push(&mut runs, Run::Delete(deleted));
                push(&mut runs, Run::Insert(inserted));
                (deleted, inserted) = (0, 0);
                push(&mut runs, Run::Equal(c));
            }
        }
    }
    push(&mut runs, Run::Delete(deleted));
    push(&mut runs, Run::Insert(inserted));
    runs
}
