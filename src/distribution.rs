//! Category mix per difficulty, and the balancing pass that applies it.

use serde::Serialize;

use crate::domain::{Category, Difficulty, Question};

/// Target share per category in percent, indexed like `Category::ALL`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DistributionTarget {
  percent: [u32; 5],
}

impl DistributionTarget {
  pub fn for_difficulty(difficulty: Difficulty) -> Self {
    let percent = match difficulty {
      Difficulty::Easy => [40, 30, 10, 10, 10],
      Difficulty::Medium => [20, 25, 20, 20, 15],
      Difficulty::Hard => [10, 15, 25, 25, 25],
    };
    Self { percent }
  }

  pub fn fraction(&self, category: Category) -> f64 {
    self.percent[category.slot()] as f64 / 100.0
  }

  /// Integer slots per category summing to `count` (largest remainder; ties go
  /// to the larger share, then to `Category::ALL` order).
  pub fn quotas(&self, count: usize) -> [usize; 5] {
    let mut quotas = [0usize; 5];
    let mut remainders = [(0usize, 0u32, 0usize); 5];
    for (slot, pct) in self.percent.iter().enumerate() {
      let scaled = count * *pct as usize;
      quotas[slot] = scaled / 100;
      remainders[slot] = (scaled % 100, *pct, slot);
    }
    let missing = count - quotas.iter().sum::<usize>();
    remainders.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)).then(a.2.cmp(&b.2)));
    for (_, _, slot) in remainders.iter().take(missing) {
      quotas[*slot] += 1;
    }
    quotas
  }

  /// Category per position for `count` rule-based questions, interleaved so a
  /// short run still covers every category with a quota.
  pub fn schedule(&self, count: usize) -> Vec<Category> {
    interleave(self.quotas(count))
  }

  /// Quotas for `count` minus what `have` already covers, clamped at zero.
  pub fn remaining_quotas(&self, count: usize, have: &[Question]) -> [usize; 5] {
    let filled = per_category(have);
    let mut left = self.quotas(count);
    for (slot, n) in left.iter_mut().enumerate() {
      *n = n.saturating_sub(filled[slot]);
    }
    left
  }

  /// Like `schedule`, for the slots `have` leaves open.
  pub fn schedule_remaining(&self, count: usize, have: &[Question]) -> Vec<Category> {
    interleave(self.remaining_quotas(count, have))
  }
}

/// Questions per category, indexed like `Category::ALL`.
pub fn per_category(questions: &[Question]) -> [usize; 5] {
  let mut counts = [0usize; 5];
  for q in questions {
    counts[q.category().slot()] += 1;
  }
  counts
}

fn interleave(mut left: [usize; 5]) -> Vec<Category> {
  let total = left.iter().sum();
  let mut out = Vec::with_capacity(total);
  while out.len() < total {
    for category in Category::ALL {
      let slot = category.slot();
      if left[slot] > 0 {
        left[slot] -= 1;
        out.push(category);
      }
    }
  }
  out
}

/// Take questions in order while their category still has quota for `count`.
/// Returns `(within quota, over quota)`, both in the original order.
pub fn split_by_quota(
  questions: Vec<Question>,
  target: &DistributionTarget,
  count: usize,
) -> (Vec<Question>, Vec<Question>) {
  let mut left = target.quotas(count);
  let mut kept = Vec::new();
  let mut over = Vec::new();
  for q in questions {
    let slot = q.category().slot();
    if left[slot] > 0 {
      left[slot] -= 1;
      kept.push(q);
    } else {
      over.push(q);
    }
  }
  (kept, over)
}

/// Fill per-category quotas greedily from `questions`, then top up from the
/// leftovers regardless of category. Keeps the assembled order and returns at
/// most `count` questions.
pub fn balance(questions: Vec<Question>, target: &DistributionTarget, count: usize) -> Vec<Question> {
  let mut left = target.quotas(count);
  let mut selected = vec![false; questions.len()];
  let mut taken = 0usize;

  for (i, q) in questions.iter().enumerate() {
    let slot = q.category().slot();
    if taken < count && left[slot] > 0 {
      left[slot] -= 1;
      selected[i] = true;
      taken += 1;
    }
  }
  for flag in selected.iter_mut() {
    if taken >= count {
      break;
    }
    if !*flag {
      *flag = true;
      taken += 1;
    }
  }

  questions.into_iter().zip(selected).filter_map(|(q, keep)| keep.then_some(q)).collect()
}
