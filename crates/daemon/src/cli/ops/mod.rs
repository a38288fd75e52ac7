pub mod daemon;
pub mod health;
pub mod init;
pub mod signin;
pub mod tree;
pub mod version;

pub use daemon::Daemon;
pub use health::Health;
pub use init::Init;
pub use signin::Signin;
pub use tree::Tree;
pub use version::Version;
