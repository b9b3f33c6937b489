//! Scenario tests for the shapecheck pipeline
//!
//! Every test builds on the web API model in [`fixtures`], the same shapes a
//! controller action sees: `Auto`, `Car : Auto`, `Cat`, `CustomResponse<T>` and the
//! framework collections.


mod test_compatibility;
