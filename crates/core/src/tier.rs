//! Tier selection from cluster size

use crate::config::TierThresholds;
use crate::types::Tier;

/// Map a cluster size to the icon tier every member of the cluster shows.
///
/// # Examples
///
/// ```
/// use tui_collapse_core::{tier_for_size, TierThresholds};
/// use tui_collapse_types::Tier;
///
/// let t = TierThresholds::new(2, 4, 5).unwrap();
/// assert_eq!(tier_for_size(1, &t), Tier::Tier1);
/// assert_eq!(tier_for_size(3, &t), Tier::Tier2);
/// assert_eq!(tier_for_size(5, &t), Tier::Tier3);
/// assert_eq!(tier_for_size(6, &t), Tier::Tier4);
/// ```
pub fn tier_for_size(size: usize, thresholds: &TierThresholds) -> Tier {
    let size = size as u64;
    if size <= thresholds.tier1_max() as u64 {
        Tier::Tier1
    } else if size <= thresholds.tier2_max() as u64 {
        Tier::Tier2
    } else if size <= thresholds.tier3_max() as u64 {
        Tier::Tier3
    } else {
        Tier::Tier4
    }
}
