//! Display names for well-known ICON addresses.

use crate::config::{self, balanced};
use crate::data::tokens;

const KNOWN_CONTRACTS: [(&str, &str); 8] = [
    (config::CHAIN_CONTRACT, "Chain"),
    (config::GOVERNANCE_CONTRACT, "Governance"),
    (config::PRICE_ORACLE_CONTRACT, "Band Oracle"),
    (config::CPS_CONTRACT, "CPS"),
    (balanced::DEX_CONTRACT, "Balanced DEX"),
    (balanced::LOANS_CONTRACT, "Balanced Loans"),
    (balanced::STABILITY_FUND_CONTRACT, "Balanced Stability Fund"),
    ("cx43e2eec79eb76293c298f2b17aec06097be606e0", "Staking"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressType {
    Address,
    Contract,
}

pub fn get_address_name(address: &str) -> Option<String> {
    if let Some((_, name)) = KNOWN_CONTRACTS.iter().find(|(a, _)| *a == address) {
        return Some((*name).to_string());
    }
    tokens::lookup(address).map(|t| t.name.to_string())
}

pub fn get_address_type(address: &str) -> Option<AddressType> {
    if address.starts_with("hx") {
        Some(AddressType::Address)
    } else if address.starts_with("cx") {
        Some(AddressType::Contract)
    } else {
        None
    }
}

/// Shortened `hx1234…abcd` form for table cells.
pub fn abbreviate(address: &str) -> String {
    if address.len() <= 14 {
        return address.to_string();
    }
    format!("{}…{}", &address[..8], &address[address.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_names() {
        assert_eq!(
            get_address_name(balanced::LOANS_CONTRACT).as_deref(),
            Some("Balanced Loans")
        );
        assert_eq!(
            get_address_name(balanced::BNUSD_CONTRACT).as_deref(),
            Some("Balanced Dollar")
        );
        assert_eq!(get_address_name("hx0000"), None);
    }

    #[test]
    fn test_address_type() {
        assert_eq!(get_address_type("hxabc"), Some(AddressType::Address));
        assert_eq!(get_address_type("cxabc"), Some(AddressType::Contract));
        assert_eq!(get_address_type(""), None);
    }

    #[test]
    fn test_abbreviate() {
        let address = format!("hx{}", "1".repeat(40));
        assert_eq!(abbreviate(&address), "hx111111…1111");
    }
}
