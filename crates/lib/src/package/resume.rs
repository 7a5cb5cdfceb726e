//! Resumption point of a step chain.

/// Index of the first step of a chain that has to run, given the completion
/// stamps of the chain in order (`0` = never completed).
///
/// A step runs when it never completed, or when its predecessor completed
/// more recently than it did (the predecessor reran, so this step is
/// outdated). `None` means the chain is up to date.
pub fn next_step_index(stamps: &[u64]) -> Option<usize> {
  for (i, pair) in stamps.windows(2).enumerate() {
    if pair[0] == 0 {
      return Some(i);
    }
    if pair[0] > pair[1] {
      return Some(i + 1);
    }
  }

  match stamps.last() {
    Some(0) => Some(stamps.len() - 1),
    _ => None,
  }
}
