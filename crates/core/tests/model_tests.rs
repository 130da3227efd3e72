use chrono::{NaiveDate, Weekday};
use btc_whatif_core::errors::CoreError;
use btc_whatif_core::models::bar::Bar;
use btc_whatif_core::models::chart::DailyPoint;
use btc_whatif_core::models::plan::{BuyRule, Frequency};
use btc_whatif_core::models::valuation::{LumpSumResult, RecurringResult, RecurringValuation};
use btc_whatif_core::models::window::DateWindow;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
//  Bar
// ═══════════════════════════════════════════════════════════════════

mod bar {
    use super::*;

    #[test]
    fn new_sets_prices() {
        let b = Bar::new(d(2024, 1, 15), 100.0, 110.0, 95.0, 105.0);
        assert_eq!(b.date, d(2024, 1, 15));
        assert_eq!(b.open, 100.0);
        assert_eq!(b.high, 110.0);
        assert_eq!(b.low, 95.0);
        assert_eq!(b.close, 105.0);
    }

    #[test]
    fn new_defaults_volume_and_vwap_to_zero() {
        let b = Bar::new(d(2024, 1, 15), 100.0, 110.0, 95.0, 105.0);
        assert_eq!(b.volume, 0.0);
        assert_eq!(b.vwap, 0.0);
    }

    #[test]
    fn with_volume_sets_everything() {
        let b = Bar::with_volume(d(2024, 1, 15), 100.0, 110.0, 95.0, 105.0, 2.5, 103.2);
        assert_eq!(b.volume, 2.5);
        assert_eq!(b.vwap, 103.2);
    }

    #[test]
    fn clone_and_equality() {
        let a = Bar::new(d(2024, 1, 15), 100.0, 110.0, 95.0, 105.0);
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn serde_roundtrip_json() {
        let b = Bar::with_volume(d(2024, 1, 15), 100.0, 110.0, 95.0, 105.0, 2.5, 103.2);
        let json = serde_json::to_string(&b).unwrap();
        let back: Bar = serde_json::from_str(&json).unwrap();
        assert_eq!(b, back);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Frequency
// ═══════════════════════════════════════════════════════════════════

mod frequency {
    use super::*;

    // 2024-01-01 is a Monday.

    #[test]
    fn daily_fires_every_day() {
        let f = Frequency::Daily;
        for offset in 0..14 {
            let date = d(2024, 1, 1) + chrono::Duration::days(offset);
            assert!(f.fires_on(date), "daily should fire on {}", date);
        }
    }

    #[test]
    fn weekly_fires_only_on_matching_weekday() {
        let f = Frequency::Weekly {
            day_of_week: Weekday::Mon,
        };
        assert!(f.fires_on(d(2024, 1, 1))); // Monday
        assert!(!f.fires_on(d(2024, 1, 2))); // Tuesday
        assert!(!f.fires_on(d(2024, 1, 7))); // Sunday
        assert!(f.fires_on(d(2024, 1, 8))); // next Monday
    }

    #[test]
    fn weekly_sunday() {
        let f = Frequency::Weekly {
            day_of_week: Weekday::Sun,
        };
        assert!(f.fires_on(d(2024, 1, 7)));
        assert!(!f.fires_on(d(2024, 1, 1)));
    }

    #[test]
    fn monthly_fires_on_matching_day() {
        let f = Frequency::Monthly { day_of_month: 15 };
        assert!(f.fires_on(d(2024, 1, 15)));
        assert!(f.fires_on(d(2024, 2, 15)));
        assert!(!f.fires_on(d(2024, 1, 14)));
        assert!(!f.fires_on(d(2024, 1, 16)));
    }

    #[test]
    fn monthly_day_31_skips_short_months() {
        let f = Frequency::Monthly { day_of_month: 31 };
        assert!(f.fires_on(d(2024, 1, 31)));
        assert!(f.fires_on(d(2024, 3, 31)));
        // April has 30 days; the rule simply never fires that month.
        for day in 1..=30 {
            assert!(!f.fires_on(d(2024, 4, day)));
        }
    }

    #[test]
    fn monthly_day_29_and_february() {
        let f = Frequency::Monthly { day_of_month: 29 };
        // 2023 is not a leap year: no firing day in February.
        for day in 1..=28 {
            assert!(!f.fires_on(d(2023, 2, day)));
        }
        // 2024 is a leap year.
        assert!(f.fires_on(d(2024, 2, 29)));
    }

    #[test]
    fn display() {
        assert_eq!(Frequency::Daily.to_string(), "daily");
        assert_eq!(
            Frequency::Weekly {
                day_of_week: Weekday::Mon
            }
            .to_string(),
            "weekly on Mon"
        );
        assert_eq!(
            Frequency::Monthly { day_of_month: 15 }.to_string(),
            "monthly on day 15"
        );
    }

    #[test]
    fn equality_and_copy() {
        let a = Frequency::Weekly {
            day_of_week: Weekday::Fri,
        };
        let b = a;
        assert_eq!(a, b);
        assert_ne!(a, Frequency::Daily);
    }

    #[test]
    fn serde_tagged_shape() {
        let daily = serde_json::to_value(Frequency::Daily).unwrap();
        assert_eq!(daily["frequency"], "daily");

        let weekly = serde_json::to_value(Frequency::Weekly {
            day_of_week: Weekday::Mon,
        })
        .unwrap();
        assert_eq!(weekly["frequency"], "weekly");
        assert_eq!(weekly["day_of_week"], "Mon");

        let monthly = serde_json::to_value(Frequency::Monthly { day_of_month: 31 }).unwrap();
        assert_eq!(monthly["frequency"], "monthly");
        assert_eq!(monthly["day_of_month"], 31);
    }

    #[test]
    fn serde_roundtrip_json() {
        for f in [
            Frequency::Daily,
            Frequency::Weekly {
                day_of_week: Weekday::Wed,
            },
            Frequency::Monthly { day_of_month: 1 },
        ] {
            let json = serde_json::to_string(&f).unwrap();
            let back: Frequency = serde_json::from_str(&json).unwrap();
            assert_eq!(f, back);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
//  BuyRule
// ═══════════════════════════════════════════════════════════════════

mod buy_rule {
    use super::*;

    // ── Constructors ──────────────────────────────────────────────

    #[test]
    fn daily_constructor() {
        let r = BuyRule::daily(10.0).unwrap();
        assert_eq!(r.amount, 10.0);
        assert_eq!(r.frequency, Frequency::Daily);
    }

    #[test]
    fn weekly_constructor() {
        let r = BuyRule::weekly(50.0, Weekday::Mon).unwrap();
        assert_eq!(r.amount, 50.0);
        assert_eq!(
            r.frequency,
            Frequency::Weekly {
                day_of_week: Weekday::Mon
            }
        );
    }

    #[test]
    fn monthly_constructor() {
        let r = BuyRule::monthly(200.0, 15).unwrap();
        assert_eq!(r.amount, 200.0);
        assert_eq!(r.frequency, Frequency::Monthly { day_of_month: 15 });
    }

    #[test]
    fn ids_are_unique() {
        let a = BuyRule::daily(10.0).unwrap();
        let b = BuyRule::daily(10.0).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn monthly_day_bounds_accepted() {
        assert!(BuyRule::monthly(10.0, 1).is_ok());
        assert!(BuyRule::monthly(10.0, 31).is_ok());
    }

    // ── Validation failures ───────────────────────────────────────

    #[test]
    fn zero_amount_rejected() {
        match BuyRule::daily(0.0).unwrap_err() {
            CoreError::InvalidAmount(msg) => assert!(msg.contains("positive")),
            other => panic!("Expected InvalidAmount, got {:?}", other),
        }
    }

    #[test]
    fn negative_amount_rejected() {
        assert!(matches!(
            BuyRule::weekly(-5.0, Weekday::Tue).unwrap_err(),
            CoreError::InvalidAmount(_)
        ));
    }

    #[test]
    fn nan_amount_rejected() {
        assert!(matches!(
            BuyRule::daily(f64::NAN).unwrap_err(),
            CoreError::InvalidAmount(_)
        ));
    }

    #[test]
    fn infinite_amount_rejected() {
        assert!(matches!(
            BuyRule::daily(f64::INFINITY).unwrap_err(),
            CoreError::InvalidAmount(_)
        ));
    }

    #[test]
    fn monthly_day_zero_rejected() {
        match BuyRule::monthly(10.0, 0).unwrap_err() {
            CoreError::InvalidRule(msg) => assert!(msg.contains("between 1 and 31")),
            other => panic!("Expected InvalidRule, got {:?}", other),
        }
    }

    #[test]
    fn monthly_day_32_rejected() {
        assert!(matches!(
            BuyRule::monthly(10.0, 32).unwrap_err(),
            CoreError::InvalidRule(_)
        ));
    }

    #[test]
    fn validate_catches_hand_built_rule() {
        let rule = BuyRule {
            id: uuid::Uuid::new_v4(),
            amount: -1.0,
            frequency: Frequency::Daily,
        };
        assert!(matches!(
            rule.validate().unwrap_err(),
            CoreError::InvalidAmount(_)
        ));
    }

    #[test]
    fn validate_catches_deserialized_out_of_range_day() {
        let json = r#"{"id":"9f9b3bb2-57f3-4da4-9b5e-7a80b5a60f2b","amount":10.0,"frequency":"monthly","day_of_month":40}"#;
        let rule: BuyRule = serde_json::from_str(json).unwrap();
        assert!(matches!(
            rule.validate().unwrap_err(),
            CoreError::InvalidRule(_)
        ));
    }

    // ── Behavior ──────────────────────────────────────────────────

    #[test]
    fn fires_on_delegates_to_frequency() {
        let r = BuyRule::weekly(50.0, Weekday::Mon).unwrap();
        assert!(r.fires_on(d(2024, 1, 1)));
        assert!(!r.fires_on(d(2024, 1, 2)));
    }

    // ── Serde ─────────────────────────────────────────────────────

    #[test]
    fn serde_flattens_frequency() {
        let r = BuyRule::weekly(25.0, Weekday::Fri).unwrap();
        let v = serde_json::to_value(&r).unwrap();
        assert!(v["id"].is_string());
        assert_eq!(v["amount"], 25.0);
        assert_eq!(v["frequency"], "weekly");
        assert_eq!(v["day_of_week"], "Fri");
    }

    #[test]
    fn serde_roundtrip_json() {
        let rules = vec![
            BuyRule::daily(10.0).unwrap(),
            BuyRule::weekly(50.0, Weekday::Sun).unwrap(),
            BuyRule::monthly(200.0, 31).unwrap(),
        ];
        let json = serde_json::to_string(&rules).unwrap();
        let back: Vec<BuyRule> = serde_json::from_str(&json).unwrap();
        assert_eq!(rules, back);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  DateWindow
// ═══════════════════════════════════════════════════════════════════

mod date_window {
    use super::*;

    const TODAY: (i32, u32, u32) = (2025, 6, 15);

    fn today() -> NaiveDate {
        d(TODAY.0, TODAY.1, TODAY.2)
    }

    // ── new ───────────────────────────────────────────────────────

    #[test]
    fn accepts_past_window() {
        let w = DateWindow::new(d(2024, 1, 1), d(2024, 1, 31), today()).unwrap();
        assert_eq!(w.start, d(2024, 1, 1));
        assert_eq!(w.end, d(2024, 1, 31));
    }

    #[test]
    fn accepts_single_day_window() {
        let w = DateWindow::new(d(2024, 1, 1), d(2024, 1, 1), today()).unwrap();
        assert_eq!(w.days(), 1);
    }

    #[test]
    fn accepts_window_ending_today() {
        let w = DateWindow::new(d(2025, 6, 1), today(), today()).unwrap();
        assert_eq!(w.end, today());
    }

    #[test]
    fn rejects_start_after_end() {
        match DateWindow::new(d(2024, 2, 1), d(2024, 1, 1), today()).unwrap_err() {
            CoreError::InvalidWindow(msg) => assert!(msg.contains("after end date")),
            other => panic!("Expected InvalidWindow, got {:?}", other),
        }
    }

    #[test]
    fn rejects_future_end() {
        match DateWindow::new(d(2025, 6, 1), d(2025, 7, 1), today()).unwrap_err() {
            CoreError::InvalidWindow(msg) => assert!(msg.contains("future")),
            other => panic!("Expected InvalidWindow, got {:?}", other),
        }
    }

    #[test]
    fn rejects_future_start_and_end() {
        let err = DateWindow::new(d(2025, 7, 1), d(2025, 7, 10), today()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidWindow(_)));
    }

    // ── from_start ────────────────────────────────────────────────

    #[test]
    fn from_start_adds_one_calendar_month() {
        let w = DateWindow::from_start(d(2024, 3, 10), today()).unwrap();
        assert_eq!(w.start, d(2024, 3, 10));
        assert_eq!(w.end, d(2024, 4, 10));
    }

    #[test]
    fn from_start_clamps_within_target_month() {
        // Jan 31 + 1 month lands on the last day of February.
        let w = DateWindow::from_start(d(2024, 1, 31), today()).unwrap();
        assert_eq!(w.end, d(2024, 2, 29)); // leap year

        let w = DateWindow::from_start(d(2023, 1, 31), today()).unwrap();
        assert_eq!(w.end, d(2023, 2, 28));

        let w = DateWindow::from_start(d(2024, 8, 31), today()).unwrap();
        assert_eq!(w.end, d(2024, 9, 30));
    }

    #[test]
    fn from_start_clamps_to_today() {
        let w = DateWindow::from_start(d(2025, 6, 5), today()).unwrap();
        assert_eq!(w.end, today());
    }

    #[test]
    fn from_start_today_gives_single_day_window() {
        let w = DateWindow::from_start(today(), today()).unwrap();
        assert_eq!(w.start, today());
        assert_eq!(w.end, today());
        assert_eq!(w.days(), 1);
    }

    #[test]
    fn from_start_rejects_future_start() {
        match DateWindow::from_start(d(2025, 6, 16), today()).unwrap_err() {
            CoreError::InvalidWindow(msg) => assert!(msg.contains("future")),
            other => panic!("Expected InvalidWindow, got {:?}", other),
        }
    }

    // ── days / display / serde ────────────────────────────────────

    #[test]
    fn days_is_inclusive() {
        let w = DateWindow::new(d(2024, 1, 1), d(2024, 1, 31), today()).unwrap();
        assert_eq!(w.days(), 31);
    }

    #[test]
    fn days_across_months() {
        let w = DateWindow::new(d(2024, 1, 15), d(2024, 2, 15), today()).unwrap();
        assert_eq!(w.days(), 32);
    }

    #[test]
    fn display_format() {
        let w = DateWindow::new(d(2024, 1, 1), d(2024, 1, 31), today()).unwrap();
        assert_eq!(w.to_string(), "2024-01-01 to 2024-01-31");
    }

    #[test]
    fn serde_roundtrip_json() {
        let w = DateWindow::new(d(2024, 1, 1), d(2024, 1, 31), today()).unwrap();
        let json = serde_json::to_string(&w).unwrap();
        let back: DateWindow = serde_json::from_str(&json).unwrap();
        assert_eq!(w, back);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Result types
// ═══════════════════════════════════════════════════════════════════

mod results {
    use super::*;

    fn sample_lump_sum() -> LumpSumResult {
        LumpSumResult {
            initial_purchase: 1000.0,
            buy_date: d(2024, 1, 1),
            buy_price: 100.0,
            units_acquired: 10.0,
            sell_date: d(2024, 1, 31),
            sell_price: 150.0,
            final_value: 1500.0,
            profit_loss: 500.0,
            percentage_profit: 50.0,
        }
    }

    fn sample_point() -> DailyPoint {
        DailyPoint {
            date: d(2024, 1, 1),
            close: 100.0,
            units_held: 0.1,
            invested: 10.0,
            daily_purchase: 10.0,
            profit_loss: 0.0,
            return_pct: 0.0,
        }
    }

    #[test]
    fn lump_sum_clone_and_equality() {
        let a = sample_lump_sum();
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn lump_sum_serde_roundtrip() {
        let r = sample_lump_sum();
        let json = serde_json::to_string(&r).unwrap();
        let back: LumpSumResult = serde_json::from_str(&json).unwrap();
        assert_eq!(r, back);
    }

    #[test]
    fn daily_point_serde_roundtrip() {
        let p = sample_point();
        let json = serde_json::to_string(&p).unwrap();
        let back: DailyPoint = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }

    #[test]
    fn recurring_valuation_serde_roundtrip() {
        let v = RecurringValuation {
            result: RecurringResult {
                total_invested: 30.0,
                final_value: 50.0,
                profit_loss: 20.0,
                percentage_profit: 200.0 / 3.0,
                total_units_acquired: 0.25,
            },
            series: vec![sample_point()],
        };
        let json = serde_json::to_string(&v).unwrap();
        let back: RecurringValuation = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}
