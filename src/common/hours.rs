// src/common/hours.rs
//
// Aritmética de horas e gaji. Tudo em Decimal com 2 casas (arredondamento comercial).

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

/// Duração fixa usada pelo fechamento automático de sessões esquecidas.
pub const AUTO_CLOSE_HOURS: i64 = 24;

const MILLIS_PER_HOUR: i64 = 3_600_000;

pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Horas entre `start` e `end`, arredondadas a 2 casas e nunca negativas.
pub fn elapsed_hours(start: DateTime<Utc>, end: DateTime<Utc>) -> Decimal {
    let millis = (end - start).num_milliseconds();
    if millis <= 0 {
        return Decimal::ZERO;
    }
    round2(Decimal::from(millis) / Decimal::from(MILLIS_PER_HOUR))
}

pub fn wage_for(hours: Decimal, rate: Decimal) -> Decimal {
    round2(hours * rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn elapsed_hours_rounds_to_two_decimals() {
        let start = Utc::now();
        // 1h 20min = 1.3333... -> 1.33
        assert_eq!(elapsed_hours(start, start + Duration::minutes(80)), Decimal::new(133, 2));
        // 30s = 0.00833 -> 0.01
        assert_eq!(elapsed_hours(start, start + Duration::seconds(30)), Decimal::new(1, 2));
        // 18s = 0.005 -> 0.01 (metade arredonda para cima)
        assert_eq!(elapsed_hours(start, start + Duration::seconds(18)), Decimal::new(1, 2));
    }

    #[test]
    fn immediate_end_is_zero_hours() {
        let start = Utc::now();
        assert_eq!(elapsed_hours(start, start), Decimal::ZERO);
        assert_eq!(elapsed_hours(start, start + Duration::milliseconds(200)), Decimal::ZERO);
    }

    #[test]
    fn clock_skew_never_produces_negative_hours() {
        let start = Utc::now();
        assert_eq!(elapsed_hours(start, start - Duration::minutes(5)), Decimal::ZERO);
    }

    #[test]
    fn segments_accrue_independently() {
        let t0 = Utc::now();
        let first = elapsed_hours(t0, t0 + Duration::minutes(50));
        let second = elapsed_hours(t0 + Duration::minutes(70), t0 + Duration::minutes(145));
        assert_eq!(first, Decimal::new(83, 2));
        assert_eq!(second, Decimal::new(125, 2));
        assert_eq!(first + second, Decimal::new(208, 2));
    }

    #[test]
    fn wage_is_hours_times_rate() {
        assert_eq!(wage_for(Decimal::new(150, 2), Decimal::from(20_000)), Decimal::from(30_000));
        assert_eq!(wage_for(Decimal::new(1, 2), Decimal::new(12_345, 0)), Decimal::new(12_345, 2));
    }
}
