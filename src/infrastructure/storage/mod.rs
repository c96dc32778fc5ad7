mod core;
mod storage_port_impl;
pub use core::*;
pub mod port_impl {
    pub use super::storage_port_impl::*;
}
