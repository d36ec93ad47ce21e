//! formsmith - schema-driven form templates and validated submissions
//!
//! A template carries an ordered schema of field descriptors. Submissions are
//! checked position by position against that schema before they are stored,
//! and every stored submission can be exported or re-validated later.

pub mod auth;
pub mod cli;
pub mod export;
pub mod forms;
pub mod http_server;
pub mod notify;
pub mod schema;
pub mod store;
