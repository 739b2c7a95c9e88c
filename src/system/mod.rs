//! Host collaborators: external commands, interfaces and the netplan tool.
//!
//! The updater only sees the [`InterfaceSource`] and [`NetworkStack`]
//! traits, so tests can substitute fakes for sysfs and netplan.

pub mod atomic;
pub mod command;
pub mod interfaces;
pub mod network_stack;
pub mod platform;

pub use atomic::{write_atomic, PRIVATE_MODE};
pub use command::{run_with_timeout, split_command, CommandResult};
pub use interfaces::{
    detect_target_interface, is_virtual, physical_interfaces, InterfaceInfo, InterfaceSource,
    SysfsInterfaces,
};
pub use network_stack::{NetplanStack, NetworkStack};
pub use platform::{is_ci, is_elevated};
