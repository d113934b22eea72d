//! # Unit Conversions
//!
//! Wei is the base unit everywhere in this workspace; these helpers exist
//! only at the edges where humans supply or read amounts.

use primitive_types::U256;

/// Wei per gwei (10^9).
pub fn gwei(amount: u64) -> U256 {
    U256::from(amount) * U256::exp10(9)
}

/// Wei per ether (10^18).
pub fn ether(amount: u64) -> U256 {
    U256::from(amount) * U256::exp10(18)
}

/// Render a wei amount as a decimal ether string, trimming trailing zeros
/// from the fraction ("1", "0.5", "1.000000000000000001").
pub fn format_ether(wei: U256) -> String {
    let divisor = U256::exp10(18);
    let whole = wei / divisor;
    let remainder = wei % divisor;

    if remainder.is_zero() {
        return whole.to_string();
    }

    let mut fraction = format!("{:018}", remainder.as_u128());
    while fraction.ends_with('0') {
        fraction.pop();
    }
    format!("{whole}.{fraction}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gwei_and_ether_scale_correctly() {
        assert_eq!(gwei(1), U256::from(1_000_000_000u64));
        assert_eq!(gwei(10), U256::from(10_000_000_000u64));
        assert_eq!(ether(1), U256::exp10(18));
    }

    #[test]
    fn format_ether_trims_fraction() {
        assert_eq!(format_ether(U256::zero()), "0");
        assert_eq!(format_ether(ether(3)), "3");
        assert_eq!(format_ether(ether(1) / 2), "0.5");
        assert_eq!(format_ether(ether(1) + U256::one()), "1.000000000000000001");
        assert_eq!(format_ether(gwei(1)), "0.000000001");
    }

    #[test]
    fn format_ether_handles_large_balances() {
        assert_eq!(format_ether(ether(10_000)), "10000");
    }
}
