/// Standard bracket seed order for `size` slots. Read two at a time, it gives
/// the round one pairings (1 v n, then the seeds that keep 1 and 2 apart).
///
/// `size` should be a power of two; anything else is rounded up, saturating
/// at `2^31`.
pub fn generate_seed_order(size: u32) -> Vec<u32> {
  if size == 0 {
    return Vec::new();
  }
  let size = size.checked_next_power_of_two().unwrap_or(1 << 31);
  let mut seeds = vec![1u32];
  while seeds.len() < size as usize {
    let n = seeds.len() as u32;
    let mut next = Vec::with_capacity(seeds.len() * 2);
    for seed in seeds.iter().copied() {
      next.push(seed);
      next.push(n * 2 + 1 - seed);
    }
    seeds = next;
  }
  seeds
}

/// `ceil(log2(count))`, zero for empty and single-entrant fields.
pub fn round_count(count: usize) -> u32 {
  count.max(1).next_power_of_two().trailing_zeros()
}

/// Slots in the padded field.
pub fn bracket_size(count: usize) -> u32 {
  1u32 << round_count(count)
}

pub fn round_name(round_number: u32, total_rounds: u32) -> String {
  match total_rounds.saturating_sub(round_number) {
    0 => crate::types::FINALS_LABEL.to_string(),
    1 => crate::types::SEMIFINALS_LABEL.to_string(),
    2 => crate::types::QUARTERFINALS_LABEL.to_string(),
    _ => format!("Round {round_number}"),
  }
}
