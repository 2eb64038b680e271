use num_bigint::BigUint;
use num_traits::ToPrimitive;

const WEI_PER_ETH: u64 = 1_000_000_000_000_000_000;
const WEI_PER_METH: u64 = 1_000_000_000_000_000;

/// Render a wei amount for display.
///
/// - `>= 1 ETH`: four decimals, `"1.2345 ETH"`
/// - `>= 0.001 ETH`: milli-ETH with two decimals, `"12.34 mETH"`
/// - below that: whole micro-ETH units, `"42 gwei"`
///
/// The tier is chosen on the exact value; rounding is half-up within the tier.
pub fn format_gas(value: &BigUint) -> String {
    if *value >= BigUint::from(WEI_PER_ETH) {
        format!("{} ETH", fixed_point(value, 14, 4))
    } else if *value >= BigUint::from(WEI_PER_METH) {
        format!("{} mETH", fixed_point(value, 13, 2))
    } else {
        format!("{} gwei", fixed_point(value, 12, 0))
    }
}

/// `value / 10^shift` rounded half-up, printed with `decimals` fractional digits.
fn fixed_point(value: &BigUint, shift: u32, decimals: u32) -> String {
    let divisor = BigUint::from(10u32).pow(shift);
    let half = &divisor >> 1u32;
    let scaled = (value + half) / divisor;
    if decimals == 0 {
        return scaled.to_str_radix(10);
    }

    let unit = BigUint::from(10u32).pow(decimals);
    let whole = &scaled / &unit;
    let frac = (&scaled % &unit).to_u64().unwrap_or_default();
    format!(
        "{}.{:0width$}",
        whole.to_str_radix(10),
        frac,
        width = decimals as usize
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;

    fn wei(s: &str) -> BigUint {
        s.parse().unwrap()
    }

    #[test]
    fn zero_is_zero_gwei() {
        assert_eq!(format_gas(&BigUint::zero()), "0 gwei");
    }

    #[test]
    fn one_eth_boundary() {
        assert_eq!(format_gas(&wei("1000000000000000000")), "1.0000 ETH");
        assert_eq!(format_gas(&wei("999999999999999999")), "1000.00 mETH");
    }

    #[test]
    fn one_meth_boundary() {
        assert_eq!(format_gas(&wei("1000000000000000")), "1.00 mETH");
        assert_eq!(format_gas(&wei("999999999999999")), "1000 gwei");
    }

    #[test]
    fn rounds_within_tier() {
        assert_eq!(format_gas(&wei("1234567800000000000")), "1.2346 ETH");
        assert_eq!(format_gas(&wei("12344999999999999")), "12.34 mETH");
        assert_eq!(format_gas(&wei("12345000000000000")), "12.35 mETH");
        assert_eq!(format_gas(&wei("499999999999")), "0 gwei");
        assert_eq!(format_gas(&wei("500000000000")), "1 gwei");
    }

    #[test]
    fn handles_values_past_u128() {
        let huge = BigUint::from(u128::MAX) * 10u32;
        let rendered = format_gas(&huge);
        assert!(rendered.ends_with(" ETH"));
        assert!(rendered.starts_with("3402823669209384634633"));
    }

    #[test]
    fn tiers_never_shrink_as_value_grows() {
        let tier = |s: &str| match s.rsplit(' ').next() {
            Some("gwei") => 0,
            Some("mETH") => 1,
            Some("ETH") => 2,
            _ => unreachable!(),
        };
        let mut last = 0;
        for exp in 0..24u32 {
            let value = BigUint::from(10u32).pow(exp);
            let t = tier(&format_gas(&value));
            assert!(t >= last, "tier dropped at 10^{exp}");
            last = t;
        }
    }
}
