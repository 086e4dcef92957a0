//! Property tests for scan invariants.
//!
//! 1. MA rule fires exactly on bars with close <= 0.98 * slow MA
//! 2. Signals come out in bar order
//! 3. Indicator computation is bit-identical on recompute
//! 4. A one-bar series has no band and never fires the Bollinger rule

use proptest::prelude::*;
use signalscan_core::domain::{Bar, Series};
use signalscan_core::indicators::{compute_indicators, IndicatorParams};
use signalscan_core::signals::{detect_signals, SignalParams, Strategy as Rule};

fn series_from_closes(closes: &[f64]) -> Series {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            date: base_date + chrono::Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000.0,
        })
        .collect();
    Series::new("PROP", bars).unwrap()
}

fn arb_closes() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0..500.0_f64, 1..120)
}

proptest! {
    #[test]
    fn ma_rule_matches_threshold(closes in arb_closes()) {
        let aug = compute_indicators(&series_from_closes(&closes), &IndicatorParams::default());
        let log = detect_signals(&aug, &SignalParams::default()).unwrap();

        for (i, row) in aug.rows().iter().enumerate() {
            let close = closes[i];
            let fired: Vec<_> = log
                .by_strategy(Rule::MovingAverage)
                .filter(|s| s.bar_index == i)
                .collect();
            if close <= 0.98 * row.slow_ma {
                prop_assert_eq!(fired.len(), 1);
                prop_assert_eq!(fired[0].trigger_price, close);
                prop_assert_eq!(fired[0].projected_sell_price, close * 1.045);
            } else {
                prop_assert!(fired.is_empty());
            }
        }
    }

    #[test]
    fn signals_follow_bar_order(closes in arb_closes()) {
        let aug = compute_indicators(&series_from_closes(&closes), &IndicatorParams::default());
        let log = detect_signals(&aug, &SignalParams::default()).unwrap();
        let indices: Vec<usize> = log.iter().map(|s| s.bar_index).collect();
        prop_assert!(indices.windows(2).all(|w| w[0] <= w[1]));
        for s in log.iter() {
            prop_assert_eq!(s.date, aug.bars()[s.bar_index].date);
        }
    }

    #[test]
    fn recompute_is_bit_identical(closes in arb_closes(), band_span in 1usize..30) {
        let series = series_from_closes(&closes);
        let params = IndicatorParams { band_span, ..IndicatorParams::default() };
        let a = compute_indicators(&series, &params);
        let b = compute_indicators(&series, &params);
        let bits = |v: Vec<f64>| v.into_iter().map(f64::to_bits).collect::<Vec<_>>();
        prop_assert_eq!(bits(a.fast_ma()), bits(b.fast_ma()));
        prop_assert_eq!(bits(a.slow_ma()), bits(b.slow_ma()));
        prop_assert_eq!(bits(a.lower_band()), bits(b.lower_band()));
    }

    #[test]
    fn single_bar_has_no_band(close in 1.0..500.0_f64) {
        let aug = compute_indicators(&series_from_closes(&[close]), &IndicatorParams::default());
        prop_assert!(aug.lower_band()[0].is_nan());
        let log = detect_signals(&aug, &SignalParams::default()).unwrap();
        prop_assert_eq!(log.by_strategy(Rule::BollingerBand).count(), 0);
    }
}
