//! Domain model (ids, states, layout, signals, actions, errors, status views).

pub mod action;
pub mod errors;
pub mod ids;
pub mod layout;
pub mod signal;
pub mod state;
pub mod status;

pub use self::action::{ActionInvocation, ActionTrust};
pub use self::errors::{ErrorKind, LifecycleError};
pub use self::ids::{ElementId, MountId};
pub use self::layout::Layout;
pub use self::signal::CommonSignal;
pub use self::state::{ReadyState, UpgradeState};
pub use self::status::{ElementStatus, ReadyCounts};
