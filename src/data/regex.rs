use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    pub static ref HOSTNAME_REGEX: Regex = Regex::new(
        r"^(([a-zA-Z0-9]|[a-zA-Z0-9][a-zA-Z0-9\-]*[a-zA-Z0-9])\.)*([A-Za-z0-9]|[A-Za-z0-9][A-Za-z0-9\-]*[A-Za-z0-9])$"
    ).unwrap();
    pub static ref ICX_ADDRESS_REGEX: Regex = Regex::new(r"^hx[a-zA-Z0-9]{40}$").unwrap();
    pub static ref ICX_CONTRACT_REGEX: Regex = Regex::new(r"^cx[a-zA-Z0-9]{40}$").unwrap();
    pub static ref ICX_TX_HASH_REGEX: Regex = Regex::new(r"^0x[a-zA-Z0-9]{64}$").unwrap();
    pub static ref IP_ADDRESS_REGEX: Regex = Regex::new(
        r"^(([0-9]|[1-9][0-9]|1[0-9]{2}|2[0-4][0-9]|25[0-5])\.){3}([0-9]|[1-9][0-9]|1[0-9]{2}|2[0-4][0-9]|25[0-5])$"
    ).unwrap();
    // Validator and contract pages only accept hex characters.
    pub static ref ICX_HEX_ADDRESS_REGEX: Regex = Regex::new(r"^hx[a-fA-F0-9]{40}$").unwrap();
    pub static ref ICX_HEX_CONTRACT_REGEX: Regex = Regex::new(r"^cx[a-fA-F0-9]{40}$").unwrap();
}

pub fn is_address(value: &str) -> bool {
    ICX_ADDRESS_REGEX.is_match(value)
}

pub fn is_contract(value: &str) -> bool {
    ICX_CONTRACT_REGEX.is_match(value)
}

pub fn is_tx_hash(value: &str) -> bool {
    ICX_TX_HASH_REGEX.is_match(value)
}

/// IPv4 address or DNS hostname.
pub fn is_host(value: &str) -> bool {
    IP_ADDRESS_REGEX.is_match(value) || HOSTNAME_REGEX.is_match(value)
}
