pub mod approval_token;
pub mod dispatcher;
pub mod ledger;
pub mod seats;
