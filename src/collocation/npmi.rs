//! Normalized pointwise mutual information.

/// NPMI of a joint event from its marginal and joint probabilities:
/// `ln(pxy / (px * py)) / -ln(pxy)`.
///
/// Values run from -1 (never together) through 0 (independent) to 1
/// (always together). A joint probability of 1 is perfect association and a
/// joint probability of 0 means the events never co-occur.
pub fn npmi(px: f64, py: f64, pxy: f64) -> f64 {
    if pxy >= 1.0 {
        return 1.0;
    }
    if pxy <= 0.0 {
        return -1.0;
    }
    (pxy / (px * py)).ln() / -pxy.ln()
}
