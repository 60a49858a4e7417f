//! Resource type tables
//!
//! Each submodule declares the domain types of one Spot resource and the
//! path overrides the mapper needs where a field name does not match its
//! type name.

pub mod elastigroup;
pub mod managed_instance;
pub mod mr_scaler;
