//! Load balancer resource: model, wire codec, diff suppression, and the
//! CRUD lifecycle driver.

pub mod codec;
pub mod lifecycle;
pub mod lookup;
pub mod members;
pub mod model;
