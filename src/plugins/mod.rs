//! Procedure implementations exposed by the RPC surface.

pub mod names;
