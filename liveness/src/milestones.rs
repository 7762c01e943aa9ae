//! Edge-triggered progress milestones.
//!
//! A milestone fires when progress moves from below it to at-or-above it.
//! Staying above a milestone fires nothing; dropping back to zero and
//! climbing again is a new crossing.

use ageproof_types::params::PROGRESS_MILESTONES;

/// Milestones crossed when progress moves from `previous` to `current`.
pub fn crossed_milestones(previous: u8, current: u8) -> impl Iterator<Item = u8> {
    PROGRESS_MILESTONES
        .into_iter()
        .filter(move |&m| previous < m && current >= m)
}
