//! # Integration Scenarios

mod fault_tolerance;
mod homomorphic;
mod hostile_input;
mod rounds;
mod tcp_transport;
