pub mod approval;
pub mod currency;
pub mod geography;
pub mod organization;
pub mod policy;
