pub mod addresses;
pub mod regex;
pub mod tokens;
