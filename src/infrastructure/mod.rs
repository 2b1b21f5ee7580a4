pub mod artifacts;
pub mod forest_model;
pub mod model_loader;
pub mod observability;
pub mod onnx_model;
