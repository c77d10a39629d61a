//! Tests for the endpoint handlers.

mod mocks;
