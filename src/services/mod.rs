pub mod balance;
pub mod notices;
pub mod search;
pub mod settlements;
