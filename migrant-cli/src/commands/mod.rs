//! CLI command implementations

pub mod init;
pub mod purge;
pub mod run;
pub mod scenario;
pub mod show;

pub use init::init;
pub use purge::purge;
pub use run::run;
pub use show::show;
