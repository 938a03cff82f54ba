#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::constants::{DEFAULT_CHECK_BONUS, DEFAULT_MAX_QSEARCH_DEPTH};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchParams {
    /// Extra plies quiescence may search past the horizon.
    pub max_qsearch_depth: u32,
    pub use_tt: bool,
    pub use_killers: bool,
    pub check_bonus: i32,
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchParams {
            max_qsearch_depth: DEFAULT_MAX_QSEARCH_DEPTH,
            use_tt: true,
            use_killers: true,
            check_bonus: DEFAULT_CHECK_BONUS,
        }
    }
}
