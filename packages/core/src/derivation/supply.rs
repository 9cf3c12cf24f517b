//! Halving-schedule arithmetic for subsidy-halving chains.
//!
//! `block_count` is the node's `blocks` field and is treated as the number
//! of mined blocks: heights `0..block_count`. Epoch `i` covers heights
//! `i * interval ..= (i + 1) * interval - 1` and pays
//! `initial_subsidy / 2^i` per block.

/// Coins issued by the first `block_count` blocks.
///
/// Closed form: every fully elapsed epoch contributes
/// `interval * initial / 2^i`, a geometric series summing to
/// `2 * interval * initial * (1 - 2^-full)`, and the running epoch
/// contributes its mined blocks at the current subsidy.
pub fn circulating_supply(block_count: u64, halving_interval: u64, initial_subsidy: f64) -> f64 {
    if halving_interval == 0 {
        return block_count as f64 * initial_subsidy;
    }

    let full_epochs = block_count / halving_interval;
    let remainder = block_count % halving_interval;

    let elapsed = 2.0 * halving_interval as f64 * initial_subsidy * (1.0 - halving_factor(full_epochs));
    let running = remainder as f64 * initial_subsidy * halving_factor(full_epochs);
    elapsed + running
}

/// Halvings that have taken effect for the most recent mined block.
pub fn halvings_elapsed(block_count: u64, halving_interval: u64) -> u64 {
    if block_count == 0 || halving_interval == 0 {
        return 0;
    }
    (block_count - 1) / halving_interval
}

/// Subsidy paid by the most recent mined block.
pub fn current_subsidy(block_count: u64, halving_interval: u64, initial_subsidy: f64) -> f64 {
    initial_subsidy * halving_factor(halvings_elapsed(block_count, halving_interval))
}

/// `2^-epoch`, saturating to zero for absurd epochs.
fn halving_factor(epoch: u64) -> f64 {
    let exponent = i32::try_from(epoch).unwrap_or(i32::MAX);
    0.5f64.powi(exponent)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalvingCountdown {
    pub next_halving_block: u64,
    pub blocks_remaining: u64,
}

pub fn next_halving(height: u64, halving_interval: u64) -> Option<HalvingCountdown> {
    if halving_interval == 0 {
        return None;
    }
    let next_halving_block = (height / halving_interval + 1).checked_mul(halving_interval)?;
    Some(HalvingCountdown {
        next_halving_block,
        blocks_remaining: next_halving_block - height,
    })
}

/// Blocks until the next difficulty adjustment boundary.
pub fn blocks_to_retarget(height: u64, retarget_interval: u64) -> u64 {
    if retarget_interval == 0 {
        return 0;
    }
    retarget_interval - height % retarget_interval
}
