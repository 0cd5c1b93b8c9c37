use bsm_pricer_core::contract::{OptionContract, OptionType};
use bsm_pricer_core::pricing::price;
use bsm_pricer_core::PricingError;

fn contract(spot: f64, strike: f64, t: f64, vol: f64, option_type: OptionType) -> OptionContract {
    OptionContract::new(spot, strike, t, 0.05, vol, option_type)
}

fn parity_gap(c: &OptionContract) -> f64 {
    let call = price(&c.with_option_type(OptionType::Call)).unwrap();
    let put = price(&c.with_option_type(OptionType::Put)).unwrap();
    let forward = c.spot * c.dividend_discount() - c.strike * c.rate_discount();
    (call - put - forward).abs()
}

// ===========================================================================
// Reference scenario
// ===========================================================================

#[test]
fn test_reference_scenario_prices() {
    let call = contract(100.0, 100.0, 1.0, 0.20, OptionType::Call);
    let put = call.with_option_type(OptionType::Put);
    assert!((price(&call).unwrap() - 10.4506).abs() < 1e-4);
    assert!((price(&put).unwrap() - 5.5735).abs() < 1e-4);
}

#[test]
fn test_put_with_dividend_reference() {
    let put = OptionContract::new(100.0, 110.0, 0.5, 0.03, 0.35, OptionType::Put)
        .with_dividend_yield(0.02);
    assert!((price(&put).unwrap() - 15.558_013_507_144_494).abs() < 1e-9);
}

// ===========================================================================
// Put-call parity
// ===========================================================================

#[test]
fn test_put_call_parity_across_grid() {
    for &spot in &[60.0, 90.0, 100.0, 110.0, 160.0] {
        for &vol in &[0.05, 0.2, 0.6, 1.5] {
            for &t in &[0.01, 0.5, 2.0, 10.0] {
                for &q in &[0.0, 0.03] {
                    let c = contract(spot, 100.0, t, vol, OptionType::Call).with_dividend_yield(q);
                    let gap = parity_gap(&c);
                    assert!(
                        gap <= 1e-9 * spot.max(100.0),
                        "parity gap {gap} at S={spot} vol={vol} T={t} q={q}"
                    );
                }
            }
        }
    }
}

#[test]
fn test_parity_holds_with_negative_rates() {
    let c = OptionContract::new(100.0, 100.0, 1.0, -0.01, 0.25, OptionType::Call);
    assert!(parity_gap(&c) < 1e-9 * 100.0);
}

// ===========================================================================
// Monotonicity
// ===========================================================================

#[test]
fn test_call_non_decreasing_in_spot() {
    let mut prev = 0.0;
    for i in 0..200 {
        let spot = 40.0 + i as f64;
        let p = price(&contract(spot, 100.0, 1.0, 0.25, OptionType::Call)).unwrap();
        assert!(p >= prev - 1e-12, "call fell at S={spot}");
        prev = p;
    }
}

#[test]
fn test_put_non_decreasing_in_strike() {
    let mut prev = 0.0;
    for i in 0..200 {
        let strike = 40.0 + i as f64;
        let p = price(&contract(100.0, strike, 1.0, 0.25, OptionType::Put)).unwrap();
        assert!(p >= prev - 1e-12, "put fell at K={strike}");
        prev = p;
    }
}

#[test]
fn test_prices_non_decreasing_in_volatility() {
    for option_type in [OptionType::Call, OptionType::Put] {
        for &spot in &[70.0, 100.0, 130.0] {
            let mut prev = 0.0;
            for i in 0..100 {
                let vol = 0.01 * i as f64;
                let p = price(&contract(spot, 100.0, 1.0, vol, option_type)).unwrap();
                assert!(p >= prev - 1e-12, "{option_type} fell at vol={vol} S={spot}");
                prev = p;
            }
        }
    }
}

// ===========================================================================
// Degenerate inputs
// ===========================================================================

#[test]
fn test_expired_equals_intrinsic_exactly() {
    for &spot in &[50.0, 89.99, 90.0, 90.01, 150.0] {
        for &vol in &[0.0, 0.2, 3.0] {
            let call = contract(spot, 90.0, 0.0, vol, OptionType::Call);
            let put = call.with_option_type(OptionType::Put);
            assert_eq!(price(&call).unwrap(), (spot - 90.0_f64).max(0.0));
            assert_eq!(price(&put).unwrap(), (90.0 - spot).max(0.0));
        }
    }
}

#[test]
fn test_degenerate_scenario_price() {
    let c = contract(100.0, 90.0, 0.0, 0.37, OptionType::Call);
    assert_eq!(price(&c).unwrap(), 10.0);
}

#[test]
fn test_extreme_inputs_never_nan() {
    let cases = [
        contract(1.0, 1e6, 0.01, 0.01, OptionType::Call),
        contract(1e6, 1.0, 0.01, 0.01, OptionType::Put),
        contract(100.0, 100.0, 1e-12, 0.2, OptionType::Call),
        contract(100.0, 100.0, 50.0, 4.0, OptionType::Put),
        contract(100.0, 100.0, 1.0, 1e-12, OptionType::Call),
    ];
    for c in &cases {
        let p = price(c).unwrap();
        assert!(p.is_finite() && p >= 0.0, "{c:?} priced at {p}");
    }
}

#[test]
fn test_invalid_inputs_fail_fast() {
    let base = contract(100.0, 100.0, 1.0, 0.2, OptionType::Call);
    let bad = [
        base.with_spot(0.0),
        base.with_strike(-10.0),
        base.with_time_to_expiry(-1.0),
        base.with_volatility(-0.2),
        base.with_risk_free_rate(f64::NAN),
        base.with_dividend_yield(f64::NEG_INFINITY),
        base.with_volatility(f64::INFINITY),
    ];
    for c in &bad {
        assert!(
            matches!(price(c), Err(PricingError::InvalidInput { .. })),
            "{c:?} should be rejected"
        );
    }
}
