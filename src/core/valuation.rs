//! Day by day valuation of contributions over a NAV series.
//!
//! Profit is allocated simple-interest style: each day's percentage move is
//! applied to the untouched principal of every active contribution and the
//! resulting profits are summed, never compounded. The first price point of a
//! series is the baseline: it seeds the day-over-day comparison and is never a
//! result row.
//!
//! The daily percentage is rounded to [`PERCENT_SCALE`] places before it is
//! applied. Every gain is then an exact decimal product, so summing gains per
//! entry or over the pooled principal gives the same number.
//!
//! Everything here is pure and synchronous. Callers parse and order the series
//! beforehand (see [`PriceSeries::parse_points`](super::nav::PriceSeries::parse_points)).

use super::ledger::Contribution;
use super::nav::PricePoint;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Growth of the valued principal on one price date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyResult {
    pub date: NaiveDate,
    pub price: Decimal,
    /// Price delta against the previous point.
    pub daily_change: Decimal,
    pub daily_change_pct: Decimal,
    pub total_principal_active: Decimal,
    pub daily_profit: Decimal,
    pub accumulated_profit: Decimal,
    /// `total_principal_active + accumulated_profit`
    pub total_balance: Decimal,
}

/// Decimal places kept of the daily percentage move.
pub const PERCENT_SCALE: u32 = 8;

/// Percentage move between two prices; a zero previous price yields a flat day.
fn daily_change_pct(prev_price: Decimal, daily_change: Decimal) -> Decimal {
    if prev_price.is_zero() {
        Decimal::ZERO
    } else {
        (daily_change / prev_price * Decimal::ONE_HUNDRED).round_dp(PERCENT_SCALE)
    }
}

fn profit(pct: Decimal, amount: Decimal) -> Decimal {
    pct * amount / Decimal::ONE_HUNDRED
}

/// Values a single principal across `prices`.
pub fn value_single(principal: Decimal, prices: &[PricePoint]) -> Vec<DailyResult> {
    let Some((baseline, rest)) = prices.split_first() else {
        return Vec::new();
    };

    let mut prev_price = baseline.price;
    let mut accumulated_profit = Decimal::ZERO;

    rest.iter()
        .map(|point| {
            let daily_change = point.price - prev_price;
            let daily_change_pct = daily_change_pct(prev_price, daily_change);
            let daily_profit = profit(daily_change_pct, principal);
            accumulated_profit += daily_profit;
            prev_price = point.price;

            DailyResult {
                date: point.date,
                price: point.price,
                daily_change,
                daily_change_pct,
                total_principal_active: principal,
                daily_profit,
                accumulated_profit,
                total_balance: principal + accumulated_profit,
            }
        })
        .collect()
}

/// Merges contributions sharing a date into one entry, ordered by date.
fn entries_by_date(contributions: &[Contribution]) -> BTreeMap<NaiveDate, Decimal> {
    let mut entries = BTreeMap::new();
    for contribution in contributions {
        *entries.entry(contribution.date).or_insert(Decimal::ZERO) += contribution.amount;
    }
    entries
}

/// Values a set of contributions entering on different dates.
///
/// An entry becomes active on the first price date on or after its own date.
/// Entries are never deactivated, so active principal and accumulated profit
/// are kept as two running aggregates and each entry is visited once.
pub fn aggregate(contributions: &[Contribution], prices: &[PricePoint]) -> Vec<DailyResult> {
    let Some((baseline, rest)) = prices.split_first() else {
        return Vec::new();
    };
    if contributions.is_empty() {
        return Vec::new();
    }

    let mut pending = entries_by_date(contributions).into_iter().peekable();
    let mut prev_price = baseline.price;
    let mut active_principal = Decimal::ZERO;
    let mut accumulated_profit = Decimal::ZERO;

    rest.iter()
        .map(|point| {
            while let Some((_, amount)) = pending.next_if(|(date, _)| *date <= point.date) {
                active_principal += amount;
            }

            let daily_change = point.price - prev_price;
            let daily_change_pct = daily_change_pct(prev_price, daily_change);
            let daily_profit = profit(daily_change_pct, active_principal);
            accumulated_profit += daily_profit;
            prev_price = point.price;

            DailyResult {
                date: point.date,
                price: point.price,
                daily_change,
                daily_change_pct,
                total_principal_active: active_principal,
                daily_profit,
                accumulated_profit,
                total_balance: active_principal + accumulated_profit,
            }
        })
        .collect()
}

/// Reference form of [`aggregate`] that rescans every entry on every day.
///
/// Keeps one explicit accumulator per entry date and recomputes the active
/// sums from them each day. It is O(days x entries) and exists to check the
/// running aggregates of [`aggregate`].
pub fn aggregate_by_rescan(
    contributions: &[Contribution],
    prices: &[PricePoint],
) -> Vec<DailyResult> {
    let Some((baseline, rest)) = prices.split_first() else {
        return Vec::new();
    };
    if contributions.is_empty() {
        return Vec::new();
    }

    let entries = entries_by_date(contributions);
    let mut accumulated_by_entry: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    let mut prev_price = baseline.price;
    let mut results = Vec::with_capacity(rest.len());

    for point in rest {
        let daily_change = point.price - prev_price;
        let daily_change_pct = daily_change_pct(prev_price, daily_change);

        let mut principal_today = Decimal::ZERO;
        let mut daily_profit = Decimal::ZERO;
        let mut accumulated_profit = Decimal::ZERO;

        for (entry_date, amount) in &entries {
            if *entry_date > point.date {
                continue;
            }
            principal_today += *amount;

            let gain = profit(daily_change_pct, *amount);
            daily_profit += gain;

            let accumulated = accumulated_by_entry
                .entry(*entry_date)
                .or_insert(Decimal::ZERO);
            *accumulated += gain;
            accumulated_profit += *accumulated;
        }

        results.push(DailyResult {
            date: point.date,
            price: point.price,
            daily_change,
            daily_change_pct,
            total_principal_active: principal_today,
            daily_profit,
            accumulated_profit,
            total_balance: principal_today + accumulated_profit,
        });
        prev_price = point.price;
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn series(points: &[(&str, Decimal)]) -> Vec<PricePoint> {
        points
            .iter()
            .map(|(d, price)| PricePoint::new(date(d), *price))
            .collect()
    }

    #[test]
    fn test_single_point_series_is_empty() {
        let prices = series(&[("2024-01-01", dec!(100))]);
        let contributions = [Contribution::new(date("2024-01-01"), dec!(1000))];

        assert!(value_single(dec!(1000), &prices).is_empty());
        assert!(aggregate(&contributions, &prices).is_empty());
        assert!(aggregate_by_rescan(&contributions, &prices).is_empty());
        assert!(value_single(dec!(1000), &[]).is_empty());
    }

    #[test]
    fn test_single_ten_percent_day() {
        let prices = series(&[("2024-01-01", dec!(100)), ("2024-01-02", dec!(110))]);

        for principal in [dec!(1), dec!(1000), dec!(2500.50)] {
            let results = value_single(principal, &prices);

            assert_eq!(results.len(), 1);
            let row = &results[0];
            assert_eq!(row.date, date("2024-01-02"));
            assert_eq!(row.daily_change, dec!(10));
            assert_eq!(row.daily_change_pct, dec!(10));
            assert_eq!(row.daily_profit, dec!(0.10) * principal);
            assert_eq!(row.accumulated_profit, dec!(0.10) * principal);
            assert_eq!(row.total_balance, dec!(1.10) * principal);
        }
    }

    #[test]
    fn test_baseline_is_consumed_not_emitted() {
        let prices = series(&[
            ("2024-01-01", dec!(50)),
            ("2024-01-02", dec!(100)),
            ("2024-01-03", dec!(100)),
        ]);

        let results = value_single(dec!(1000), &prices);

        // The baseline only seeds the comparison; the first row is measured
        // against it and the flat day after against the first row.
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].date, date("2024-01-02"));
        assert_eq!(results[0].daily_change_pct, dec!(100));
        assert_eq!(results[0].daily_profit, dec!(1000));
        assert_eq!(results[1].date, date("2024-01-03"));
        assert_eq!(results[1].daily_change_pct, dec!(0));
        assert_eq!(results[1].accumulated_profit, dec!(1000));
        assert_eq!(results[1].total_balance, dec!(2000));
    }

    #[test]
    fn test_profit_uses_original_principal() {
        let prices = series(&[
            ("2024-01-01", dec!(100)),
            ("2024-01-02", dec!(110)),
            ("2024-01-03", dec!(121)),
        ]);

        let results = value_single(dec!(1000), &prices);

        // Two +10% days on 1000 add 100 each, no compounding.
        assert_eq!(results[1].daily_change_pct, dec!(10));
        assert_eq!(results[1].daily_profit, dec!(100));
        assert_eq!(results[1].accumulated_profit, dec!(200));
        assert_eq!(results[1].total_balance, dec!(1200));
    }

    #[test]
    fn test_negative_returns_have_no_floor() {
        let prices = series(&[
            ("2024-01-01", dec!(100)),
            ("2024-01-02", dec!(50)),
            ("2024-01-03", dec!(25)),
        ]);

        let results = value_single(dec!(1000), &prices);

        assert_eq!(results[0].accumulated_profit, dec!(-500));
        assert_eq!(results[1].accumulated_profit, dec!(-1000));
        assert_eq!(results[1].total_balance, dec!(0));
    }

    #[test]
    fn test_zero_baseline_yields_flat_day() {
        let prices = series(&[("2024-01-01", dec!(0)), ("2024-01-02", dec!(10))]);
        let contributions = [Contribution::new(date("2024-01-01"), dec!(1000))];

        let single = value_single(dec!(1000), &prices);
        let multi = aggregate(&contributions, &prices);

        assert_eq!(single[0].daily_change, dec!(10));
        assert_eq!(single[0].daily_change_pct, dec!(0));
        assert_eq!(single[0].daily_profit, dec!(0));
        assert_eq!(multi[0].daily_change_pct, dec!(0));
        assert_eq!(multi[0].total_balance, dec!(1000));
    }

    #[test]
    fn test_valuation_is_deterministic() {
        let prices = series(&[
            ("2024-01-01", dec!(1032.4417)),
            ("2024-01-02", dec!(1033.0921)),
            ("2024-01-03", dec!(1031.7702)),
            ("2024-01-04", dec!(1034.0001)),
        ]);
        let contributions = [
            Contribution::new(date("2024-01-02"), dec!(1500000)),
            Contribution::new(date("2024-01-03"), dec!(250000)),
        ];

        assert_eq!(
            value_single(dec!(1500000), &prices),
            value_single(dec!(1500000), &prices)
        );
        assert_eq!(
            aggregate(&contributions, &prices),
            aggregate(&contributions, &prices)
        );
    }

    #[test]
    fn test_end_to_end_scenario() {
        let contributions = [Contribution::new(date("2024-01-02"), dec!(1000))];
        let prices = series(&[
            ("2024-01-01", dec!(100)),
            ("2024-01-02", dec!(100)),
            ("2024-01-03", dec!(110)),
        ]);

        for results in [
            aggregate(&contributions, &prices),
            aggregate_by_rescan(&contributions, &prices),
        ] {
            assert_eq!(results.len(), 2);

            let entry_day = &results[0];
            assert_eq!(entry_day.date, date("2024-01-02"));
            assert_eq!(entry_day.total_principal_active, dec!(1000));
            assert_eq!(entry_day.daily_change_pct, dec!(0));
            assert_eq!(entry_day.total_balance, dec!(1000));

            let up_day = &results[1];
            assert_eq!(up_day.date, date("2024-01-03"));
            assert_eq!(up_day.daily_change_pct, dec!(10));
            assert_eq!(up_day.total_principal_active, dec!(1000));
            assert_eq!(up_day.daily_profit, dec!(100));
            assert_eq!(up_day.accumulated_profit, dec!(100));
            assert_eq!(up_day.total_balance, dec!(1100));
        }
    }

    #[test]
    fn test_same_date_contributions_match_single_tranche() {
        let prices = series(&[
            ("2024-03-01", dec!(1200)),
            ("2024-03-04", dec!(1212)),
            ("2024-03-05", dec!(1190.5)),
            ("2024-03-06", dec!(1250)),
        ]);
        let contributions = [
            Contribution::new(date("2024-03-01"), dec!(700)),
            Contribution::new(date("2024-03-01"), dec!(300)),
        ];

        let single = value_single(dec!(1000), &prices);

        assert_eq!(aggregate(&contributions, &prices), single);
        assert_eq!(aggregate_by_rescan(&contributions, &prices), single);
    }

    #[test]
    fn test_late_entry_is_excluded() {
        let prices = series(&[
            ("2024-01-01", dec!(100)),
            ("2024-01-02", dec!(105)),
            ("2024-01-03", dec!(110)),
        ]);
        let contributions = [
            Contribution::new(date("2024-01-01"), dec!(1000)),
            Contribution::new(date("2024-02-01"), dec!(5000)),
        ];

        let results = aggregate(&contributions, &prices);

        assert_eq!(results.len(), 2);
        assert!(
            results
                .iter()
                .all(|row| row.total_principal_active == dec!(1000))
        );
        assert_eq!(results, value_single(dec!(1000), &prices));
    }

    #[test]
    fn test_entry_activates_on_its_own_date() {
        let prices = series(&[
            ("2024-01-01", dec!(100)),
            ("2024-01-02", dec!(110)),
            ("2024-01-03", dec!(121)),
            ("2024-01-04", dec!(133.1)),
        ]);
        let contributions = [
            Contribution::new(date("2024-01-01"), dec!(1000)),
            Contribution::new(date("2024-01-03"), dec!(2000)),
        ];

        let results = aggregate(&contributions, &prices);
        let principals: Vec<_> = results.iter().map(|r| r.total_principal_active).collect();

        assert_eq!(principals, vec![dec!(1000), dec!(3000), dec!(3000)]);

        // The second entry earns from its own date onwards.
        assert_eq!(results[0].daily_profit, dec!(100));
        assert_eq!(results[1].daily_profit, dec!(300));
        assert_eq!(results[2].daily_profit, dec!(300));
        assert_eq!(results[2].accumulated_profit, dec!(700));
        assert_eq!(results[2].total_balance, dec!(3700));
    }

    #[test]
    fn test_entry_between_price_dates_activates_on_next_date() {
        let prices = series(&[
            ("2024-01-05", dec!(100)),
            ("2024-01-08", dec!(120)),
            ("2024-01-09", dec!(132)),
        ]);
        // Dated on a weekend without a published price.
        let contributions = [Contribution::new(date("2024-01-06"), dec!(1000))];

        let results = aggregate(&contributions, &prices);

        assert_eq!(results[0].total_principal_active, dec!(1000));
        assert_eq!(results[0].daily_profit, dec!(200));
        assert_eq!(results[1].daily_profit, dec!(100));
        assert_eq!(results, aggregate_by_rescan(&contributions, &prices));
    }

    #[test]
    fn test_no_active_entries_yields_zero_rows() {
        let prices = series(&[
            ("2024-01-01", dec!(100)),
            ("2024-01-02", dec!(90)),
            ("2024-01-03", dec!(99)),
        ]);
        let contributions = [Contribution::new(date("2024-01-03"), dec!(1000))];

        let results = aggregate(&contributions, &prices);

        assert_eq!(results[0].total_principal_active, dec!(0));
        assert_eq!(results[0].daily_profit, dec!(0));
        assert_eq!(results[0].total_balance, dec!(0));
        assert_eq!(results[1].total_principal_active, dec!(1000));
        assert_eq!(results[1].daily_change_pct, dec!(10));
        assert_eq!(results[1].total_balance, dec!(1100));
    }

    #[test]
    fn test_running_aggregates_match_rescan_on_published_navs() {
        let prices = series(&[
            ("2024-01-01", dec!(1032.4417)),
            ("2024-01-02", dec!(1033.0921)),
            ("2024-01-03", dec!(1031.7702)),
            ("2024-01-04", dec!(1034.0001)),
            ("2024-01-05", dec!(1036.2287)),
            ("2024-01-06", dec!(1033.1519)),
            ("2024-01-07", dec!(1037.0003)),
        ]);
        let contributions = [
            Contribution::new(date("2024-01-02"), dec!(1500000)),
            Contribution::new(date("2024-01-04"), dec!(250000.33)),
            Contribution::new(date("2024-01-05"), dec!(777777.77)),
        ];

        let results = aggregate(&contributions, &prices);

        assert_eq!(results, aggregate_by_rescan(&contributions, &prices));
        for row in &results {
            assert!(row.daily_change_pct.scale() <= PERCENT_SCALE);
        }
    }

    #[test]
    fn test_daily_percentage_is_rounded() {
        let prices = series(&[("2024-01-01", dec!(3)), ("2024-01-02", dec!(4))]);

        let results = value_single(dec!(300), &prices);

        assert_eq!(results[0].daily_change_pct, dec!(33.33333333));
        assert_eq!(results[0].daily_profit, dec!(99.99999999));
    }

    #[test]
    fn test_empty_contributions_yield_empty_results() {
        let prices = series(&[("2024-01-01", dec!(100)), ("2024-01-02", dec!(101))]);

        assert!(aggregate(&[], &prices).is_empty());
        assert!(aggregate_by_rescan(&[], &prices).is_empty());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    // Four decimal NAVs as published, with the odd zero price.
    fn nav_strategy() -> impl Strategy<Value = Decimal> {
        prop_oneof![
            1 => Just(Decimal::ZERO),
            20 => (5_000_000i64..50_000_000).prop_map(|units| Decimal::new(units, 4)),
        ]
    }

    fn prices_strategy() -> impl Strategy<Value = Vec<PricePoint>> {
        prop::collection::vec((1i64..4, nav_strategy()), 1..40).prop_map(|steps| {
            let mut date = start();
            steps
                .into_iter()
                .map(|(gap, price)| {
                    date += Duration::days(gap);
                    PricePoint::new(date, price)
                })
                .collect()
        })
    }

    fn contributions_strategy() -> impl Strategy<Value = Vec<Contribution>> {
        prop::collection::vec((-3i64..130, 1i64..100_000_000), 0..25).prop_map(|entries| {
            entries
                .into_iter()
                .map(|(offset, cents)| {
                    Contribution::new(start() + Duration::days(offset), Decimal::new(cents, 2))
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn running_aggregates_match_rescan(
            prices in prices_strategy(),
            contributions in contributions_strategy(),
        ) {
            prop_assert_eq!(
                aggregate(&contributions, &prices),
                aggregate_by_rescan(&contributions, &prices)
            );
        }

        #[test]
        fn principal_is_gated_by_date(
            prices in prices_strategy(),
            contributions in contributions_strategy(),
        ) {
            for row in aggregate(&contributions, &prices) {
                let expected: Decimal = contributions
                    .iter()
                    .filter(|c| c.date <= row.date)
                    .map(|c| c.amount)
                    .sum();
                prop_assert_eq!(row.total_principal_active, expected);
                prop_assert_eq!(
                    row.total_balance,
                    row.total_principal_active + row.accumulated_profit
                );
            }
        }
    }
}
