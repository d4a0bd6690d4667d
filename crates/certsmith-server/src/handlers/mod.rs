pub mod doc;
pub mod health;
pub mod issue;
