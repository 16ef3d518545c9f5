pub mod balanced;
pub mod cps;
pub mod de;
pub mod formatted;
pub mod github;
pub mod icx;
