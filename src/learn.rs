//! Online semi-gradient TD(0) weight update.
//!
//! The value function is linear in the hand-designed features, so the
//! feature vector of the pre-move state is the gradient with respect to the
//! active weights. Updates are clipped against reward spikes and projected
//! onto the non-negative orthant: every feature is a non-negative signal, so
//! a negative weight is treated as invalid and discarded.

use crate::engine::CELLS;
use crate::eval::{FeatureVector, WeightPair, Weights};

/// TD errors are clipped to `[-TD_ERROR_CLIP, TD_ERROR_CLIP]` before use.
pub const TD_ERROR_CLIP: f64 = 10.0;

/// Empty-cell counts below this select the panic vector for the update.
///
/// The count is reconstructed from the normalized `empty_ratio` feature as
/// `features[0] * 16`; the threshold sits just under 4 so a reconstructed
/// 4.0 that lands at 3.999999... is not misrouted into panic mode.
pub const PANIC_UPDATE_THRESHOLD: f64 = 3.99;

/// Apply one TD(0) update to whichever weight vector was active for the
/// pre-move state.
///
/// `features` must be the extraction of the pre-move board; `td_error` is
/// `target - evaluate(pre_move_state)`. Never fails.
pub fn td_update(
    weights: &mut WeightPair,
    features: &FeatureVector,
    td_error: f64,
    learning_rate: f64,
) {
    let empty_estimate = features[0] * CELLS as f64;
    let target = if empty_estimate < PANIC_UPDATE_THRESHOLD {
        &mut weights.panic
    } else {
        &mut weights.normal
    };
    apply(target, features, td_error, learning_rate);
}

fn apply(weights: &mut Weights, features: &FeatureVector, td_error: f64, learning_rate: f64) {
    let err = td_error.clamp(-TD_ERROR_CLIP, TD_ERROR_CLIP);
    for (w, f) in weights.0.iter_mut().zip(features.iter()) {
        *w = (*w + learning_rate * err * f).max(0.0);
    }
}
