use crate::datasource::{PriceField, PriceSource};
use crate::domain::{Decimal, Instrument};
use crate::error::AnalyzerError;
use serde::Serialize;
use std::collections::BTreeMap;

/// An open position marked at a chosen price field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionMark {
    pub instrument: Instrument,
    pub size: Decimal,
    pub price: Decimal,
}

impl PositionMark {
    pub fn value(&self) -> Decimal {
        self.size * self.price
    }
}

/// Mark every non-flat position at `field`, `ago` bars back.
///
/// # Errors
/// Fails with `MissingField` if an instrument's feed does not carry `field`.
pub fn open_positions<P: PriceSource + ?Sized>(
    sizes: &BTreeMap<Instrument, Decimal>,
    prices: &P,
    field: PriceField,
    ago: usize,
) -> Result<BTreeMap<Instrument, PositionMark>, AnalyzerError> {
    sizes
        .iter()
        .filter(|(_, size)| !size.is_zero())
        .map(|(instrument, size)| {
            let price = prices.price(instrument, field, ago)?;
            Ok((
                instrument.clone(),
                PositionMark {
                    instrument: instrument.clone(),
                    size: *size,
                    price,
                },
            ))
        })
        .collect()
}
