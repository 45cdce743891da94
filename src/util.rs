//! Shared utility modules used across Phrasaurus components.

pub mod partition;
pub mod simd;
