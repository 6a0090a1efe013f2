use crate::domain::Decimal;
use crate::error::AnalyzerError;

/// Trading periods in a year, used to annualize.
pub const DEFAULT_PERIODS_PER_YEAR: u32 = 252;

/// Annualized realized volatility of the most recent `look_back` portfolio values.
///
/// A look back that resolves to zero steps returns `0`. A look back longer than the
/// history is an error rather than a silently shortened window.
pub fn realized_volatility(
    values: &[Decimal],
    look_back: usize,
    periods_per_year: u32,
) -> Result<Decimal, AnalyzerError> {
    let n = look_back.min(values.len());
    if n == 0 {
        return Ok(Decimal::zero());
    }
    if look_back > values.len() {
        return Err(AnalyzerError::EmptyLookback {
            requested: look_back,
            available: values.len(),
        });
    }

    let window = &values[values.len() - n..];

    // First return is defined as zero; steps after a zero value have no return.
    let mut returns = vec![Decimal::zero()];
    for pair in window.windows(2) {
        if pair[0].is_zero() {
            continue;
        }
        let ratio = pair[1]
            .checked_div(pair[0])
            .ok_or(AnalyzerError::VolatilityOverflow)?;
        returns.push(ratio - Decimal::one());
    }

    let sum_sq = returns
        .iter()
        .try_fold(Decimal::zero(), |acc, r| {
            r.checked_mul(*r).and_then(|sq| acc.checked_add(sq))
        })
        .ok_or(AnalyzerError::VolatilityOverflow)?;
    let count = Decimal::from(returns.len() as i64);
    let variance = sum_sq
        .checked_div(count)
        .and_then(|v| v.checked_mul(Decimal::from(periods_per_year)))
        .ok_or(AnalyzerError::VolatilityOverflow)?;

    Ok(variance.sqrt().unwrap_or_default())
}
